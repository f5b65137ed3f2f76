//! Reference token authority implementing the server side of the wire contract.
//!
//! The integration suite and demos run this in-process double wherever a real authority (a
//! cluster metadata service, typically) would sit. It is also the normative description of
//! what a compliant server must do:
//!
//! - Only `GET` requests are dispatched; other methods receive no response and the
//!   connection stays open for the next request.
//! - Routing walks a fixed-order table of path fragments and takes the first match. Matching
//!   is anchored at the path root (a prefix match on the query-stripped path), a deliberate
//!   tightening over older deployments that matched fragments anywhere in the URI.
//! - Fetch answers 200 with the encoded credential set holding the configured token keyed by
//!   the configured service URL. Renew and cancel decode the presented token from the query:
//!   malformed parameters are a handler fault (400, fault message as body), a well-formed but
//!   unexpected token is an authentication failure (401), and a matching token yields 200
//!   with the configured expiration (renew) or an empty body (cancel). The diagnostic
//!   exception route always answers 405.
//! - Handler faults are additionally published on a bounded channel the server owner drains
//!   after driving an operation.
//! - Request-parse and I/O faults close the connection without a response.

mod http1;

use http1::{Http1Request, Http1Response};

// std
use std::net::SocketAddr;
// crates.io
use tokio::{
	io::{BufReader, BufWriter},
	net::{TcpListener, TcpStream},
	sync::{mpsc, watch},
	task::JoinHandle,
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, Token},
	authority::{
		self, CANCEL_SEGMENT, EXCEPTION_SEGMENT, FETCH_SEGMENT, RENEW_SEGMENT,
	},
	codec,
	fetcher::Expiration,
};

const FAULT_CHANNEL_CAPACITY: usize = 8;
const UNAUTHORIZED_BODY: &[u8] = b"Presented token does not match the issuing authority.";

/// Error type produced while starting an [`AuthorityServer`].
#[derive(Debug, ThisError)]
pub enum ServerError {
	/// The listener could not be bound or inspected.
	#[error("Failed to bind the authority listener.")]
	Bind(#[source] std::io::Error),
}

/// Operations the authority routes requests to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
	/// Diagnostic route that always answers 405.
	Exception,
	/// Token cancellation.
	Cancel,
	/// Token issuance.
	Fetch,
	/// Token renewal.
	Renew,
}
impl RouteKind {
	/// Returns a stable label suitable for diagnostics.
	pub const fn as_str(self) -> &'static str {
		match self {
			RouteKind::Exception => "exception",
			RouteKind::Cancel => "cancel",
			RouteKind::Fetch => "fetch",
			RouteKind::Renew => "renew",
		}
	}
}

/// Ordered route table; the first matching fragment wins.
const ROUTES: &[(&str, RouteKind)] = &[
	(EXCEPTION_SEGMENT, RouteKind::Exception),
	(CANCEL_SEGMENT, RouteKind::Cancel),
	(FETCH_SEGMENT, RouteKind::Fetch),
	(RENEW_SEGMENT, RouteKind::Renew),
];

/// Resolves the query-stripped request path against the route table.
pub fn resolve(path: &str) -> Option<RouteKind> {
	let trimmed = path.strip_prefix('/').unwrap_or(path);

	ROUTES
		.iter()
		.find(|(fragment, _)| trimmed.starts_with(fragment))
		.map(|(_, route)| *route)
}

/// Fault raised inside a route handler, mirrored to the owner's fault channel.
#[derive(Debug, ThisError)]
#[error("{route} handler fault: {message}")]
pub struct HandlerFault {
	/// Route whose handler raised the fault.
	pub route: RouteKind,
	/// Human-readable fault payload; doubles as the 400 response body.
	pub message: String,
}
impl HandlerFault {
	fn new(route: RouteKind, source: impl Display) -> Self {
		Self { route, message: source.to_string() }
	}
}
impl Display for RouteKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Static configuration of the reference authority.
#[derive(Clone, Debug)]
pub struct AuthorityConfig {
	/// The only token this authority issues and accepts.
	pub token: Token,
	/// Service URL the issued credential set is keyed by.
	pub service: String,
	/// Expiration value reported for every renewal.
	pub expiration: Expiration,
}
impl AuthorityConfig {
	/// Bundles the authority's token, service URL, and renewal expiration.
	pub fn new(token: Token, service: impl Into<String>, expiration: Expiration) -> Self {
		Self { token, service: service.into(), expiration }
	}
}

/// In-process reference authority bound to a local TCP port.
pub struct AuthorityServer {
	local_addr: SocketAddr,
	faults: mpsc::Receiver<HandlerFault>,
	shutdown: watch::Sender<bool>,
	task: JoinHandle<()>,
}
impl AuthorityServer {
	/// Binds `addr` and starts serving the contract.
	pub async fn bind(addr: SocketAddr, config: AuthorityConfig) -> Result<Self, ServerError> {
		let listener = TcpListener::bind(addr).await.map_err(ServerError::Bind)?;

		Self::from_listener(listener, config)
	}

	/// Starts serving the contract on an already-bound listener.
	///
	/// Binding first lets callers learn the ephemeral port before constructing the token
	/// whose service field must name this authority's URL.
	pub fn from_listener(
		listener: TcpListener,
		config: AuthorityConfig,
	) -> Result<Self, ServerError> {
		let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
		let (fault_tx, fault_rx) = mpsc::channel(FAULT_CHANNEL_CAPACITY);
		let (shutdown_tx, shutdown_rx) = watch::channel(false);
		let task = tokio::spawn(serve(listener, Arc::new(config), fault_tx, shutdown_rx));

		Ok(Self { local_addr, faults: fault_rx, shutdown: shutdown_tx, task })
	}

	/// Returns the bound socket address.
	pub fn local_addr(&self) -> SocketAddr {
		self.local_addr
	}

	/// Returns the authority's base URL.
	pub fn url(&self) -> String {
		format!("http://{}", self.local_addr)
	}

	/// Drains one handler fault, if a handler has raised one.
	///
	/// Responses are written only after the fault is published, so a caller that has observed
	/// an operation's outcome can rely on the corresponding fault already being visible here.
	pub fn try_fault(&mut self) -> Option<HandlerFault> {
		self.faults.try_recv().ok()
	}

	/// Stops the accept loop and releases the bound port.
	///
	/// In-flight connection tasks finish their current exchange independently.
	pub async fn shutdown(self) {
		let _ = self.shutdown.send(true);
		let _ = self.task.await;
	}
}
impl Debug for AuthorityServer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorityServer").field("local_addr", &self.local_addr).finish_non_exhaustive()
	}
}

async fn serve(
	listener: TcpListener,
	config: Arc<AuthorityConfig>,
	faults: mpsc::Sender<HandlerFault>,
	mut shutdown: watch::Receiver<bool>,
) {
	loop {
		tokio::select! {
			accepted = listener.accept() => {
				let Ok((stream, _)) = accepted else {
					continue;
				};

				tokio::spawn(handle_connection(stream, config.clone(), faults.clone()));
			},
			_ = shutdown.changed() => break,
		}
	}
}

async fn handle_connection(
	stream: TcpStream,
	config: Arc<AuthorityConfig>,
	faults: mpsc::Sender<HandlerFault>,
) {
	let (read_half, write_half) = stream.into_split();
	let mut reader = BufReader::new(read_half);
	let mut writer = BufWriter::new(write_half);

	loop {
		let request = match http1::read_request(&mut reader).await {
			Ok(Some(request)) => request,
			// EOF, parse fault, or I/O fault: close without a response.
			Ok(None) | Err(_) => return,
		};

		// Non-GET requests are dropped without a response; the connection stays open.
		if request.method != "GET" {
			continue;
		}

		let path = request.target.split('?').next().unwrap_or("");
		let Some(route) = resolve(path) else {
			continue;
		};
		let response = match dispatch(route, &request, &config) {
			Ok(response) => response,
			Err(fault) => {
				let body = fault.message.clone().into_bytes();

				let _ = faults.try_send(fault);

				Http1Response::new(400, body)
			},
		};
		let _ = http1::write_response(&mut writer, &response).await;

		// One response per connection; the peer is told to reconnect via `Connection: close`.
		return;
	}
}

fn dispatch(
	route: RouteKind,
	request: &Http1Request,
	config: &AuthorityConfig,
) -> Result<Http1Response, HandlerFault> {
	match route {
		RouteKind::Exception => Ok(Http1Response::empty(405)),
		RouteKind::Fetch => handle_fetch(config),
		RouteKind::Renew => authenticated(route, request, config, || {
			Http1Response::new(200, config.expiration.to_string().into_bytes())
		}),
		RouteKind::Cancel => authenticated(route, request, config, || Http1Response::empty(200)),
	}
}

fn handle_fetch(config: &AuthorityConfig) -> Result<Http1Response, HandlerFault> {
	let mut credentials = Credentials::new();

	credentials.insert(config.service.clone(), config.token.clone());

	let frame = codec::encode(&credentials).map_err(|e| HandlerFault::new(RouteKind::Fetch, e))?;

	Ok(Http1Response::new(200, frame))
}

/// Decodes the presented token and runs `respond` only when it matches the configured one.
fn authenticated(
	route: RouteKind,
	request: &Http1Request,
	config: &AuthorityConfig,
	respond: impl FnOnce() -> Http1Response,
) -> Result<Http1Response, HandlerFault> {
	let query = request.target.split_once('?').map(|(_, query)| query).unwrap_or("");
	let presented =
		authority::token_from_query(query).map_err(|e| HandlerFault::new(route, e))?;

	if presented != config.token {
		return Ok(Http1Response::new(401, UNAUTHORIZED_BODY.to_vec()));
	}

	Ok(respond())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn routing_order_is_fixed_and_first_match_wins() {
		assert_eq!(resolve("/exception"), Some(RouteKind::Exception));
		assert_eq!(resolve("/cancelDelegationToken"), Some(RouteKind::Cancel));
		assert_eq!(resolve("/getDelegationToken"), Some(RouteKind::Fetch));
		assert_eq!(resolve("/renewDelegationToken"), Some(RouteKind::Renew));
		assert_eq!(resolve("/unknown"), None);
	}

	#[test]
	fn matching_is_anchored_at_the_path_root() {
		// Older deployments matched fragments anywhere in the URI; this table does not.
		assert_eq!(resolve("/nested/renewDelegationToken"), None);
		// Prefix looseness past the fragment is retained.
		assert_eq!(resolve("/renewDelegationTokenExtra"), Some(RouteKind::Renew));
	}

	#[test]
	fn fetch_handler_encodes_the_configured_token() {
		let token = Token::new(
			b"srv-id".to_vec(),
			b"srv-pw".to_vec(),
			"DELEGATION_TOKEN",
			"http://localhost:50470",
		)
		.expect("Server token fixture should be valid.");
		let config = AuthorityConfig::new(
			token.clone(),
			"http://localhost:50470",
			Expiration::from_millis(1),
		);
		let response = handle_fetch(&config).expect("Fetch handler should encode the set.");
		let decoded = codec::decode(&response.body)
			.expect("Fetch handler output should decode as a credential frame.");

		assert_eq!(decoded.token_for("http://localhost:50470"), Some(&token));
	}
}
