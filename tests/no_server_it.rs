#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use tokio::net::TcpListener;
// self
use delegation_fetcher::{
	auth::Token,
	authority::Authority,
	error::{Error, OperationError, TransportError},
	fetcher::Fetcher,
	store::{CredentialStore, MemoryStore},
};

/// Allocates a localhost URL whose port was just released, so nothing is listening on it.
async fn unreachable_authority() -> (Authority, Token) {
	let listener = TcpListener::bind(("127.0.0.1", 0))
		.await
		.expect("Probe listener should bind an ephemeral port.");
	let url = format!(
		"http://{}",
		listener.local_addr().expect("Probe listener should report its address.")
	);

	drop(listener);

	let authority = Authority::parse(&url).expect("Probe URL should parse.");
	let token = Token::new(b"id".to_vec(), b"pw".to_vec(), "TEST_DELEGATION_TOKEN", &url)
		.expect("Probe token fixture should be valid.");

	(authority, token)
}

fn build_fetcher(authority: Authority) -> (Fetcher<delegation_fetcher::http::ReqwestTransport>, Arc<MemoryStore>) {
	let store_backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = store_backend.clone();
	let fetcher = Fetcher::new(authority, store).expect("Default fetcher should build.");

	(fetcher, store_backend)
}

#[tokio::test]
async fn fetch_without_a_server_is_unreachable_and_persists_nothing() {
	let (authority, _) = unreachable_authority().await;
	let (fetcher, store) = build_fetcher(authority);
	let error = fetcher.fetch().await.expect_err("Fetch without a server should fail.");

	assert!(
		matches!(
			error,
			Error::Fetch(OperationError::Unreachable(TransportError::Connection { .. }))
		),
		"Expected a connection failure, got {error:?}."
	);
	assert!(store.snapshot().is_none(), "A failed fetch must not persist a partial set.");
}

#[tokio::test]
async fn renew_without_a_server_is_unreachable() {
	let (authority, token) = unreachable_authority().await;
	let (fetcher, store) = build_fetcher(authority);
	let error = fetcher.renew(&token).await.expect_err("Renew without a server should fail.");

	assert!(
		matches!(
			error,
			Error::Renew(OperationError::Unreachable(TransportError::Connection { .. }))
		),
		"Expected a connection failure, got {error:?}."
	);
	assert!(store.snapshot().is_none(), "A failed renew must leave no side effects.");
}

#[tokio::test]
async fn cancel_without_a_server_is_unreachable() {
	let (authority, token) = unreachable_authority().await;
	let (fetcher, store) = build_fetcher(authority);
	let error = fetcher.cancel(&token).await.expect_err("Cancel without a server should fail.");

	assert!(
		matches!(
			error,
			Error::Cancel(OperationError::Unreachable(TransportError::Connection { .. }))
		),
		"Expected a connection failure, got {error:?}."
	);
	assert!(store.snapshot().is_none(), "A failed cancel must leave no side effects.");
}
