//! Opaque delegation-token model.

// self
use crate::{_prelude::*, auth::secret::SecretBytes};

/// Errors produced when constructing a [`Token`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenError {
	/// Issued when the identifier holds no bytes.
	#[error("Token identifier must not be empty.")]
	EmptyIdentifier,
	/// Issued when the password holds no bytes.
	#[error("Token password must not be empty.")]
	EmptyPassword,
}

/// Opaque credential unit issued by a token authority.
///
/// The identifier and password are byte blobs the client never interprets; the kind tags the
/// token type and the service names the issuing authority's base URL. Two tokens are equal when
/// all four fields match, which is the comparison the authority applies before honoring a
/// renew/cancel request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
	identifier: Vec<u8>,
	password: SecretBytes,
	kind: String,
	service: String,
}
impl Token {
	/// Validates and constructs a token; identifier and password must be non-empty.
	pub fn new(
		identifier: impl Into<Vec<u8>>,
		password: impl Into<Vec<u8>>,
		kind: impl Into<String>,
		service: impl Into<String>,
	) -> Result<Self, TokenError> {
		let identifier = identifier.into();
		let password = SecretBytes::new(password);

		if identifier.is_empty() {
			return Err(TokenError::EmptyIdentifier);
		}
		if password.is_empty() {
			return Err(TokenError::EmptyPassword);
		}

		Ok(Self { identifier, password, kind: kind.into(), service: service.into() })
	}

	/// Returns the opaque identifier bytes.
	pub fn identifier(&self) -> &[u8] {
		&self.identifier
	}

	/// Returns the password secret.
	pub fn password(&self) -> &SecretBytes {
		&self.password
	}

	/// Returns the token kind tag.
	pub fn kind(&self) -> &str {
		&self.kind
	}

	/// Returns the URI of the issuing authority.
	pub fn service(&self) -> &str {
		&self.service
	}
}
