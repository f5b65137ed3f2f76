//! Transport primitives for delegation-token exchanges.
//!
//! The module exposes [`HttpTransport`] as the crate's only dependency on an HTTP stack.
//! Callers provide an implementation (typically behind `Arc<T>` where `T: HttpTransport`) and
//! the fetcher issues exactly one `GET` per operation through it. Implementations must
//! aggregate response bodies up to a bound instead of buffering blindly, so a misbehaving
//! authority cannot exhaust the client's memory.

// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Maximum number of response-body bytes the built-in transport aggregates.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;
#[cfg(feature = "reqwest")] const CONNECT_TIMEOUT: std::time::Duration =
	std::time::Duration::from_secs(10);
#[cfg(feature = "reqwest")] const REQUEST_TIMEOUT: std::time::Duration =
	std::time::Duration::from_secs(30);

/// Future alias returned by [`HttpTransport`] implementations.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing token-lifecycle requests.
///
/// Implementations perform a single `GET` with no automatic retries; retry policy, if any
/// exists, belongs to the caller. Connect and read must be bounded by timeouts so no
/// operation hangs indefinitely.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Issues one `GET` against `url` and aggregates the full response.
	fn get<'a>(&'a self, url: &'a Url) -> TransportFuture<'a>;
}

/// Fully aggregated HTTP response handed back to the protocol layer.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers, values lossily decoded for inspection.
	pub headers: Vec<(String, String)>,
	/// Aggregated response body.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests must not follow redirects; a redirecting authority would otherwise leak
/// query-borne token material to an unrelated host. Configure any custom [`ReqwestClient`]
/// to disable redirect following before handing it over.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	body_limit: usize,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with redirects disabled and bounded connect/request timeouts.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.connect_timeout(CONNECT_TIMEOUT)
			.timeout(REQUEST_TIMEOUT)
			.build()?;

		Ok(Self::with_client(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, body_limit: MAX_RESPONSE_BYTES }
	}

	/// Overrides the response-body aggregation bound.
	pub fn with_body_limit(mut self, limit: usize) -> Self {
		self.body_limit = limit;

		self
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn get<'a>(&'a self, url: &'a Url) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut response = self
				.client
				.get(url.clone())
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let headers = response
				.headers()
				.iter()
				.map(|(name, value)| {
					(name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
				})
				.collect();
			let mut body = Vec::new();

			while let Some(chunk) = response.chunk().await.map_err(TransportError::from)? {
				if body.len() + chunk.len() > self.body_limit {
					return Err(TransportError::ResponseTooLarge { limit: self.body_limit });
				}

				body.extend_from_slice(&chunk);
			}

			Ok(RawResponse { status, headers, body })
		})
	}
}
