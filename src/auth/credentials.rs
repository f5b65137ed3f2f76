//! Credential sets mapping service names to tokens.

// self
use crate::{_prelude::*, auth::token::Token};

/// Ordered mapping from service name to the token that authenticates against it.
///
/// At most one token is held per service name; inserting under an existing name replaces the
/// previous token. Iteration order is the lexicographic order of the service names, which keeps
/// encoded frames deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Credentials(BTreeMap<String, Token>);
impl Credentials {
	/// Creates an empty credential set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a token under `service`, returning the replaced token if one was present.
	pub fn insert(&mut self, service: impl Into<String>, token: Token) -> Option<Token> {
		self.0.insert(service.into(), token)
	}

	/// Returns the token stored for `service`, if any.
	pub fn token_for(&self, service: &str) -> Option<&Token> {
		self.0.get(service)
	}

	/// Iterates the stored `(service, token)` pairs in deterministic order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
		self.0.iter().map(|(service, token)| (service.as_str(), token))
	}

	/// Returns the number of stored tokens.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no tokens are stored.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
