//! Simple file-backed [`CredentialStore`] for command-line fetchers and lightweight jobs.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	codec,
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential set to a binary credential file after each write.
///
/// The on-disk layout is the wire frame produced by [`codec::encode`], so a file written here
/// can be consumed by any implementation of the protocol regardless of language.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Opens a store at the provided path, creating missing parent directories eagerly.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path })
	}

	/// Returns the destination path this store writes to.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist(&self, credentials: &Credentials) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let frame = codec::encode(credentials).map_err(|e| StoreError::Serialization {
			message: format!("Failed to encode credential frame: {e}"),
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&frame).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn load(&self) -> Result<Credentials, StoreError> {
		if !self.path.exists() {
			return Ok(Credentials::new());
		}

		let frame = fs::read(&self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", self.path.display()),
		})?;

		codec::decode(&frame).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn write(&self, credentials: Credentials) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.persist(&credentials) })
	}

	fn read(&self) -> StoreFuture<'_, Credentials> {
		Box::pin(async move { self.load() })
	}
}
