//! Session token persistence over an injected key-value store.
//!
//! Nothing is cached here: every read goes back to the store, so a token set
//! or cleared by one caller is visible to the next request immediately.

use std::sync::Arc;

use tracing::warn;

use super::auth::AccessToken;
use super::ports::{KeyValueStore, StoreError};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Reads and writes the current session token.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    /// Wrap a key-value store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Return the stored token, if any.
    ///
    /// Store failures are logged and read as "no token".
    pub fn get_token(&self) -> Option<AccessToken> {
        match self.store.get(TOKEN_KEY) {
            Ok(value) => value.and_then(AccessToken::new),
            Err(error) => {
                warn!(error = %error, "token store read failed; treating session as signed out");
                None
            }
        }
    }

    /// Store `token`, or remove the stored token when `None`.
    ///
    /// Store failures are logged; the call itself never fails.
    pub fn set_token(&self, token: Option<&AccessToken>) {
        let result = match token {
            Some(token) => self.store.set(TOKEN_KEY, token.as_str()),
            None => self.store.remove(TOKEN_KEY),
        };
        if let Err(error) = result {
            warn!(error = %error, cleared = token.is_none(), "token store write failed");
        }
    }

    /// Store `token`, reporting a failed write to the caller.
    ///
    /// # Errors
    ///
    /// Returns the store's [`StoreError`] when the token was not persisted.
    pub fn persist_token(&self, token: &AccessToken) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, token.as_str())
    }

    /// Remove the stored token.
    pub fn clear(&self) {
        self.set_token(None);
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("key", &TOKEN_KEY)
            .finish_non_exhaustive()
    }
}
