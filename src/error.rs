//! Crate-level error types shared across the fetcher, transport, and stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The fetch operation did not produce a credential set.
	#[error("Token fetch failed.")]
	Fetch(#[source] OperationError),
	/// The renew operation did not produce a new expiration.
	#[error("Token renewal failed.")]
	Renew(#[source] OperationError),
	/// The cancel operation was not acknowledged.
	#[error("Token cancellation failed.")]
	Cancel(#[source] OperationError),
}

/// Terminal failure of a single fetch/renew/cancel exchange.
///
/// The variants keep the three observable outcomes apart: no server reachable
/// ([`Unreachable`](Self::Unreachable)), the server answered but refused the operation
/// ([`Rejected`](Self::Rejected)), and the server claimed success with a payload the client
/// cannot decode ([`MalformedResponse`](Self::MalformedResponse) /
/// [`Credentials`](Self::Credentials)).
#[derive(Debug, ThisError)]
pub enum OperationError {
	/// Transport-level failure; the authority never executed the operation.
	#[error(transparent)]
	Unreachable(#[from] TransportError),
	/// The authority answered with a non-200 status.
	#[error("Authority rejected the operation with HTTP {status}: {body}.")]
	Rejected {
		/// HTTP status code returned by the authority.
		status: u16,
		/// Diagnostic body, lossily decoded for display.
		body: String,
	},
	/// The authority reported success but the payload could not be interpreted.
	#[error("Authority returned an undecodable success payload: {message}.")]
	MalformedResponse {
		/// Human-readable description of the decode failure.
		message: String,
	},
	/// The authority reported success but the credential frame is corrupt.
	#[error(transparent)]
	Credentials(#[from] crate::codec::CodecError),
}
impl OperationError {
	/// Builds a [`Rejected`](Self::Rejected) variant from a raw response.
	pub fn rejected(status: u16, body: &[u8]) -> Self {
		Self::Rejected { status, body: String::from_utf8_lossy(body).trim().to_owned() }
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Authority base URL cannot be parsed.
	#[error("Authority URL is invalid.")]
	InvalidAuthority {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Authority base URL cannot carry appended operation paths.
	#[error("Authority URL `{url}` cannot carry operation paths.")]
	UnsupportedAuthority {
		/// The offending URL, rendered for diagnostics.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ConfigError {
	fn from(e: reqwest::Error) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, resource bounds).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The connection could not be established or died mid-exchange; covers DNS failures,
	/// refused connections, and timeouts.
	#[error("Network error occurred while calling the token authority.")]
	Connection {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The aggregated response body would exceed the configured bound.
	#[error("Response body exceeds the {limit}-byte aggregation bound.")]
	ResponseTooLarge {
		/// Maximum number of body bytes the transport aggregates.
		limit: usize,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token authority.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn connection(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Connection { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::connection(e)
	}
}
