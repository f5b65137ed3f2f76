//! Rust’s turnkey delegation-token lifecycle client—fetch, renew, and cancel opaque cluster
//! credentials over HTTP with pluggable transports, credential stores, and a reference
//! authority for tests.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authority;
pub mod codec;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod obs;
pub mod server;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use tokio::net::TcpListener;
	// self
	use crate::{
		auth::Token,
		authority::Authority,
		fetcher::{Expiration, Fetcher},
		http::ReqwestTransport,
		server::{AuthorityConfig, AuthorityServer},
		store::{CredentialStore, MemoryStore},
	};

	/// Fetcher type alias used by reqwest-backed integration tests.
	pub type ReqwestTestFetcher = Fetcher<ReqwestTransport>;

	/// Expiration value the reference authority reports for every renewal.
	pub const TEST_EXPIRATION: i64 = 124_123_512_361_236;

	/// Builds the token fixture shared across the lifecycle tests.
	pub fn test_token(service: &str) -> Token {
		Token::new(
			b"owner:renewer:realuser".to_vec(),
			b"fixture-password".to_vec(),
			"TEST_DELEGATION_TOKEN",
			service,
		)
		.expect("Test token fixture should pass validation.")
	}

	/// Spawns a reference authority on an ephemeral localhost port.
	///
	/// The bound URL doubles as the token's service, so the returned token authenticates
	/// against the returned server for renew/cancel round trips.
	pub async fn spawn_test_authority() -> (AuthorityServer, Token) {
		let listener = TcpListener::bind(("127.0.0.1", 0))
			.await
			.expect("Test authority should bind an ephemeral port.");
		let url = format!(
			"http://{}",
			listener.local_addr().expect("Bound listener should report its address.")
		);
		let token = test_token(&url);
		let config =
			AuthorityConfig::new(token.clone(), &url, Expiration::from_millis(TEST_EXPIRATION));
		let server = AuthorityServer::from_listener(listener, config)
			.expect("Test authority should start from a bound listener.");

		(server, token)
	}

	/// Constructs a [`Fetcher`] backed by an in-memory store and the reqwest transport used
	/// across integration tests.
	pub fn build_reqwest_test_fetcher(
		authority_url: &str,
	) -> (ReqwestTestFetcher, Arc<MemoryStore>) {
		let authority =
			Authority::parse(authority_url).expect("Test authority URL should be valid.");
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let transport =
			ReqwestTransport::new().expect("Failed to build reqwest transport for tests.");
		let fetcher = Fetcher::with_transport(authority, store, transport);

		(fetcher, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
