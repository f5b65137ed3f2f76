//! Secure byte-secret wrapper that redacts sensitive material.

// self
use crate::_prelude::*;

/// Redacted byte-secret wrapper keeping token passwords out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretBytes(Vec<u8>);
impl SecretBytes {
	/// Wraps new secret bytes.
	pub fn new(value: impl Into<Vec<u8>>) -> Self {
		Self(value.into())
	}

	/// Returns the inner bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	/// Returns the number of secret bytes without exposing them.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the secret holds no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<[u8]> for SecretBytes {
	fn as_ref(&self) -> &[u8] {
		self.expose()
	}
}
impl Debug for SecretBytes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SecretBytes").field(&"<redacted>").finish()
	}
}
impl Display for SecretBytes {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = SecretBytes::new(b"super-secret".to_vec());

		assert_eq!(format!("{secret:?}"), "SecretBytes(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn secret_equality_compares_bytes() {
		assert_eq!(SecretBytes::new(b"a".to_vec()), SecretBytes::new(b"a".to_vec()));
		assert_ne!(SecretBytes::new(b"a".to_vec()), SecretBytes::new(b"b".to_vec()));
	}
}
