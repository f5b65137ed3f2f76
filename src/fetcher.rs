//! Token-lifecycle operations against a remote authority.
//!
//! The [`Fetcher`] owns the HTTP transport, the credential store, and the authority
//! descriptor so the individual operations can focus on wire semantics. Every operation is a
//! single request/response exchange on the calling task: it either fully succeeds and is
//! decoded, or it fails with a typed error and leaves no persisted state behind. There is no
//! retry transition; terminal outcomes are reported immediately.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, Token},
	authority::Authority,
	codec,
	error::OperationError,
	http::{HttpTransport, RawResponse},
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::CredentialStore,
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Fetcher specialized for the crate's default reqwest transport stack.
pub type ReqwestFetcher = Fetcher<ReqwestTransport>;

/// New expiration instant reported by a successful renewal.
///
/// The integer's unit is authority-defined; stock deployments report milliseconds since the
/// Unix epoch, which [`Expiration::instant`] assumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiration(i64);
impl Expiration {
	/// Wraps a raw expiration value.
	pub fn from_millis(value: i64) -> Self {
		Self(value)
	}

	/// Returns the raw expiration value.
	pub fn millis(self) -> i64 {
		self.0
	}

	/// Interprets the value as milliseconds since the Unix epoch.
	pub fn instant(self) -> Result<OffsetDateTime, time::error::ComponentRange> {
		OffsetDateTime::from_unix_timestamp_nanos(self.0 as i128 * 1_000_000)
	}
}
impl Display for Expiration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl FromStr for Expiration {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(s.parse()?))
	}
}

/// Coordinates token-lifecycle operations against a single authority.
///
/// The fetcher owns the transport, the store, and the authority descriptor so operation
/// implementations stay free of wiring concerns. Operations share nothing mutable; the
/// fetcher can be cloned cheaply and driven from concurrent tasks.
#[derive(Clone)]
pub struct Fetcher<T>
where
	T: ?Sized + HttpTransport,
{
	/// HTTP transport used for every outbound authority request.
	pub transport: Arc<T>,
	/// Store that persists fetched credential sets.
	pub store: Arc<dyn CredentialStore>,
	/// Authority descriptor providing the operation URLs.
	pub authority: Authority,
}
impl<T> Fetcher<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a fetcher that reuses the caller-provided transport.
	pub fn with_transport(
		authority: Authority,
		store: Arc<dyn CredentialStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self { transport: transport.into(), store, authority }
	}

	/// Obtains a fresh credential set from the authority and persists it.
	///
	/// The request carries no token parameters; the authority issues for the caller's
	/// transport-level identity. On success the decoded set is written through the store
	/// before it is returned.
	pub async fn fetch(&self) -> Result<Credentials> {
		const KIND: OpKind = OpKind::Fetch;

		let span = OpSpan::new(KIND, "fetch");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.authority.fetch_url();
				let response = self.exchange(&url).await.map_err(Error::Fetch)?;
				let credentials = codec::decode(&response.body)
					.map_err(|e| Error::Fetch(OperationError::Credentials(e)))?;

				self.store.write(credentials.clone()).await?;

				Ok(credentials)
			})
			.await;

		obs::record_op_outcome(KIND, outcome_of(&result));

		result
	}

	/// Extends `token`'s validity, returning the authority's new expiration.
	pub async fn renew(&self, token: &Token) -> Result<Expiration> {
		const KIND: OpKind = OpKind::Renew;

		let span = OpSpan::new(KIND, "renew");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.authority.renew_url(token);
				let response = self.exchange(&url).await.map_err(Error::Renew)?;

				parse_expiration(&response.body).map_err(Error::Renew)
			})
			.await;

		obs::record_op_outcome(KIND, outcome_of(&result));

		result
	}

	/// Invalidates `token` early; a 200 acknowledgment carries no body to interpret.
	pub async fn cancel(&self, token: &Token) -> Result<()> {
		const KIND: OpKind = OpKind::Cancel;

		let span = OpSpan::new(KIND, "cancel");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.authority.cancel_url(token);

				self.exchange(&url).await.map_err(Error::Cancel)?;

				Ok(())
			})
			.await;

		obs::record_op_outcome(KIND, outcome_of(&result));

		result
	}

	/// Performs the single GET every operation is built from and applies the shared
	/// status-code policy: 200 passes through, everything else is a rejection.
	async fn exchange(&self, url: &Url) -> Result<RawResponse, OperationError> {
		let response = self.transport.get(url).await?;

		if response.status != 200 {
			return Err(OperationError::rejected(response.status, &response.body));
		}

		Ok(response)
	}
}
#[cfg(feature = "reqwest")]
impl Fetcher<ReqwestTransport> {
	/// Creates a fetcher with the crate's default reqwest transport.
	pub fn new(
		authority: Authority,
		store: Arc<dyn CredentialStore>,
	) -> Result<Self, ConfigError> {
		Ok(Self::with_transport(authority, store, ReqwestTransport::new()?))
	}
}
impl<T> Debug for Fetcher<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Fetcher").field("authority", &self.authority).finish_non_exhaustive()
	}
}

fn outcome_of<V>(result: &Result<V>) -> OpOutcome {
	match result {
		Ok(_) => OpOutcome::Success,
		Err(_) => OpOutcome::Failure,
	}
}

fn parse_expiration(body: &[u8]) -> Result<Expiration, OperationError> {
	let text = std::str::from_utf8(body).map_err(|_| OperationError::MalformedResponse {
		message: "expiration body is not UTF-8".into(),
	})?;

	text.trim().parse().map_err(|_| OperationError::MalformedResponse {
		message: format!("expected a decimal expiration, got {:?}", text.trim()),
	})
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiration_parses_decimal_strings() {
		let expiration: Expiration =
			"124123512361236".parse().expect("Decimal expirations should parse.");

		assert_eq!(expiration.millis(), 124_123_512_361_236);
		assert_eq!(expiration.to_string(), "124123512361236");
	}

	#[test]
	fn expiration_converts_to_an_instant() {
		let instant = Expiration::from_millis(0)
			.instant()
			.expect("The epoch should convert to an instant.");

		assert_eq!(instant, macros::datetime!(1970-01-01 00:00 UTC));
	}

	#[test]
	fn expiration_bodies_reject_garbage() {
		assert!(matches!(
			parse_expiration(b"not-a-number"),
			Err(OperationError::MalformedResponse { .. })
		));
		assert!(matches!(
			parse_expiration(&[0xFF, 0xFE]),
			Err(OperationError::MalformedResponse { .. })
		));
		assert!(parse_expiration(b" 42\n").is_ok());
	}
}
