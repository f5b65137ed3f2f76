//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Credentials,
	store::{CredentialStore, StoreFuture},
};

type StoreSlot = Arc<RwLock<Option<Credentials>>>;

/// Thread-safe storage backend that keeps the credential set in-process for tests and demos.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreSlot);
impl MemoryStore {
	/// Returns the stored set, or `None` if nothing has been written yet.
	///
	/// Tests use this to assert that failed operations left no persisted state behind.
	pub fn snapshot(&self) -> Option<Credentials> {
		self.0.read().clone()
	}
}
impl CredentialStore for MemoryStore {
	fn write(&self, credentials: Credentials) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move {
			*slot.write() = Some(credentials);

			Ok(())
		})
	}

	fn read(&self) -> StoreFuture<'_, Credentials> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(slot.read().clone().unwrap_or_default()) })
	}
}
