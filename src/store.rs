//! Storage contracts and built-in credential-store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credentials};

/// Persistence contract future for credential stores.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for fetched credential sets.
///
/// A store holds exactly one credential set; `write` replaces it wholesale and `read` must
/// reproduce the most recent write byte-for-byte, including per-token identifier and password
/// material.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists `credentials`, replacing any previously stored set.
	fn write(&self, credentials: Credentials) -> StoreFuture<'_, ()>;

	/// Loads the stored credential set; an unwritten store yields an empty set.
	fn read(&self) -> StoreFuture<'_, Credentials>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Credential-frame serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;
	use std::error::Error as StdError;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unreachable".into() };
		let crate_error: Error = store_error.clone().into();

		assert!(matches!(crate_error, Error::Store(_)));
		assert!(crate_error.to_string().contains("disk unreachable"));

		let source = StdError::source(&crate_error)
			.expect("Crate error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
