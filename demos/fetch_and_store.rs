//! Demonstrates the full token lifecycle against an in-process reference authority: fetch a
//! credential set into a file store, renew the token, then cancel it.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use tokio::net::TcpListener;
// self
use delegation_fetcher::{
	auth::Token,
	authority::Authority,
	fetcher::{Expiration, Fetcher},
	server::{AuthorityConfig, AuthorityServer},
	store::{CredentialStore, FileStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
	let url = format!("http://{}", listener.local_addr()?);
	let token = Token::new(
		b"demo-identifier".to_vec(),
		b"demo-password".to_vec(),
		"DEMO_DELEGATION_TOKEN",
		&url,
	)?;
	let server = AuthorityServer::from_listener(
		listener,
		AuthorityConfig::new(token.clone(), &url, Expiration::from_millis(1_768_000_000_000)),
	)?;
	let destination = std::env::temp_dir().join("delegation_fetcher_demo.dta");
	let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(&destination)?);
	let fetcher = Fetcher::new(Authority::parse(&url)?, store)?;
	let credentials = fetcher.fetch().await?;

	println!("Fetched {} token(s) into {}.", credentials.len(), destination.display());

	let expiration = fetcher.renew(&token).await?;

	println!("Renewed until {expiration} ms since the epoch.");

	fetcher.cancel(&token).await?;
	println!("Cancelled the token.");

	server.shutdown().await;

	Ok(())
}
