// std
use std::time::Duration;
// crates.io
use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	net::{TcpListener, TcpStream},
	time,
};
// self
use delegation_fetcher::{
	auth::Token,
	fetcher::Expiration,
	server::{AuthorityConfig, AuthorityServer},
};

const READ_GRACE: Duration = Duration::from_millis(300);

async fn spawn_authority() -> AuthorityServer {
	let listener = TcpListener::bind(("127.0.0.1", 0))
		.await
		.expect("Authority should bind an ephemeral port.");
	let url = format!(
		"http://{}",
		listener.local_addr().expect("Bound listener should report its address.")
	);
	let token = Token::new(b"id".to_vec(), b"pw".to_vec(), "TEST_DELEGATION_TOKEN", &url)
		.expect("Authority token fixture should be valid.");
	let config = AuthorityConfig::new(token, &url, Expiration::from_millis(1));

	AuthorityServer::from_listener(listener, config)
		.expect("Authority should start from a bound listener.")
}

async fn expect_silence(stream: &mut TcpStream) {
	let mut buffer = [0u8; 64];
	let read = time::timeout(READ_GRACE, stream.read(&mut buffer)).await;

	assert!(read.is_err(), "The authority must not answer; it wrote {read:?}.");
}

#[tokio::test]
async fn non_get_requests_receive_no_response_and_keep_the_connection_open() {
	let server = spawn_authority().await;
	let mut stream = TcpStream::connect(server.local_addr())
		.await
		.expect("Connecting to the authority should succeed.");

	stream
		.write_all(b"POST /getDelegationToken HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n")
		.await
		.expect("Writing the POST request should succeed.");
	expect_silence(&mut stream).await;

	// The connection is still being served: a GET on the same socket gets a response.
	stream
		.write_all(b"GET /exception HTTP/1.1\r\nHost: x\r\n\r\n")
		.await
		.expect("Writing the follow-up GET should succeed.");

	let mut response = String::new();

	stream
		.read_to_string(&mut response)
		.await
		.expect("Reading the follow-up response should succeed.");

	assert!(
		response.starts_with("HTTP/1.1 405"),
		"Expected the diagnostic 405, got {response:?}."
	);

	server.shutdown().await;
}

#[tokio::test]
async fn unmatched_paths_receive_no_response() {
	let server = spawn_authority().await;
	let mut stream = TcpStream::connect(server.local_addr())
		.await
		.expect("Connecting to the authority should succeed.");

	stream
		.write_all(b"GET /unrelated HTTP/1.1\r\nHost: x\r\n\r\n")
		.await
		.expect("Writing the unmatched GET should succeed.");
	expect_silence(&mut stream).await;

	server.shutdown().await;
}

#[tokio::test]
async fn shutdown_releases_the_bound_port() {
	let server = spawn_authority().await;
	let addr = server.local_addr();

	server.shutdown().await;

	assert!(
		TcpStream::connect(addr).await.is_err(),
		"No listener should remain on the released port."
	);
}
