//! Token-authority descriptor and the token query-string codec.
//!
//! The wire protocol keys every operation off a path suffix appended to the authority's base
//! URL, with the presented token carried as query parameters: `kind` and `service`
//! percent-encoded verbatim, `identifier` and `password` as URL-safe unpadded base64. A fresh
//! deployment should prefer a header or body for the secret material, but the suffixes and
//! their semantics are the compatibility surface and must not change.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenError},
	error::ConfigError,
};

/// Path segment appended to the base URL for the fetch operation.
pub const FETCH_SEGMENT: &str = "getDelegationToken";
/// Path segment appended to the base URL for the renew operation.
pub const RENEW_SEGMENT: &str = "renewDelegationToken";
/// Path segment appended to the base URL for the cancel operation.
pub const CANCEL_SEGMENT: &str = "cancelDelegationToken";
/// Diagnostic segment the reference authority always answers with HTTP 405.
pub const EXCEPTION_SEGMENT: &str = "exception";

const PARAM_KIND: &str = "kind";
const PARAM_SERVICE: &str = "service";
const PARAM_IDENTIFIER: &str = "identifier";
const PARAM_PASSWORD: &str = "password";

/// Validated base URL of a token-issuing authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authority {
	base: Url,
}
impl Authority {
	/// Parses and validates an authority base URL.
	///
	/// The URL must be able to carry appended path segments, which rules out
	/// cannot-be-a-base schemes such as `mailto:`.
	pub fn parse(value: &str) -> Result<Self, ConfigError> {
		let base = Url::parse(value).map_err(|e| ConfigError::InvalidAuthority { source: e })?;

		if base.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedAuthority { url: base.to_string() });
		}

		Ok(Self { base })
	}

	/// Returns the validated base URL.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Builds the fetch operation URL; fetch carries no token parameters.
	pub fn fetch_url(&self) -> Url {
		self.op_url(FETCH_SEGMENT)
	}

	/// Builds the renew operation URL carrying `token` as query parameters.
	pub fn renew_url(&self, token: &Token) -> Url {
		let mut url = self.op_url(RENEW_SEGMENT);

		append_token(&mut url, token);

		url
	}

	/// Builds the cancel operation URL carrying `token` as query parameters.
	pub fn cancel_url(&self, token: &Token) -> Url {
		let mut url = self.op_url(CANCEL_SEGMENT);

		append_token(&mut url, token);

		url
	}

	fn op_url(&self, segment: &str) -> Url {
		let mut url = self.base.clone();

		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(segment);
		}

		url
	}
}
impl FromStr for Authority {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Display for Authority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.base, f)
	}
}

/// Errors produced while reconstructing a token from request query parameters.
#[derive(Debug, ThisError)]
pub enum TokenQueryError {
	/// A required parameter is absent.
	#[error("Token query is missing the `{name}` parameter.")]
	MissingParameter {
		/// Name of the absent parameter.
		name: &'static str,
	},
	/// A byte-valued parameter is not valid URL-safe base64.
	#[error("Token query parameter `{name}` is not valid base64.")]
	InvalidEncoding {
		/// Name of the malformed parameter.
		name: &'static str,
		/// Underlying decode failure.
		#[source]
		source: base64::DecodeError,
	},
	/// The decoded parameters fail token validation.
	#[error(transparent)]
	Invalid(#[from] TokenError),
}

/// Appends `token` to `url` as the protocol's query parameters.
pub fn append_token(url: &mut Url, token: &Token) {
	url.query_pairs_mut()
		.append_pair(PARAM_KIND, token.kind())
		.append_pair(PARAM_SERVICE, token.service())
		.append_pair(PARAM_IDENTIFIER, &URL_SAFE_NO_PAD.encode(token.identifier()))
		.append_pair(PARAM_PASSWORD, &URL_SAFE_NO_PAD.encode(token.password().expose()));
}

/// Reconstructs the presented token from a raw query string.
pub fn token_from_query(query: &str) -> Result<Token, TokenQueryError> {
	let mut kind = None;
	let mut service = None;
	let mut identifier = None;
	let mut password = None;

	for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
		match name.as_ref() {
			PARAM_KIND => kind = Some(value.into_owned()),
			PARAM_SERVICE => service = Some(value.into_owned()),
			PARAM_IDENTIFIER => identifier = Some(decode_bytes(PARAM_IDENTIFIER, &value)?),
			PARAM_PASSWORD => password = Some(decode_bytes(PARAM_PASSWORD, &value)?),
			_ => (),
		}
	}

	let kind = kind.ok_or(TokenQueryError::MissingParameter { name: PARAM_KIND })?;
	let service = service.ok_or(TokenQueryError::MissingParameter { name: PARAM_SERVICE })?;
	let identifier =
		identifier.ok_or(TokenQueryError::MissingParameter { name: PARAM_IDENTIFIER })?;
	let password = password.ok_or(TokenQueryError::MissingParameter { name: PARAM_PASSWORD })?;

	Ok(Token::new(identifier, password, kind, service)?)
}

fn decode_bytes(name: &'static str, value: &str) -> Result<Vec<u8>, TokenQueryError> {
	URL_SAFE_NO_PAD
		.decode(value)
		.map_err(|e| TokenQueryError::InvalidEncoding { name, source: e })
}
