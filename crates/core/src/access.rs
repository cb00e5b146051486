// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential lifecycle: cached token validation, password and refresh grants.
//!
//! [`ApiAccess`] is single-writer. Every lifecycle operation takes `&mut self`
//! and blocks the caller for at most one bounded token exchange.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::AccessError;
use crate::oauth::{Grant, TokenClient, TokenResponse};
use crate::paths::StorePaths;
use crate::store::{unix_now, AuthRecord, Store, TokenBundle};

/// Media type of the JSON:API endpoints.
pub const CONTENT_TYPE: &str = "application/vnd.api+json";

/// Authenticated session state for one user.
#[derive(Debug)]
pub struct ApiAccess {
    server: ServerConfig,
    store: Store,
    client: TokenClient,
    has_access: bool,
    headers: HashMap<String, String>,
    user: String,
    auth: Option<TokenBundle>,
}

impl ApiAccess {
    /// New session in the initial state, persisting under the default paths.
    pub fn new(server: ServerConfig) -> Self {
        Self::with_store(server, Store::new(StorePaths::default()))
    }

    pub fn with_store(server: ServerConfig, store: Store) -> Self {
        Self {
            server,
            store,
            client: TokenClient::new(),
            has_access: false,
            headers: HashMap::new(),
            user: String::new(),
            auth: None,
        }
    }

    /// Override the per-request timeout (default [`crate::oauth::TOKEN_TIMEOUT`]).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn has_access(&self) -> bool {
        self.has_access
    }

    /// Request headers for protected endpoints. Empty unless [`has_access`](Self::has_access).
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Last known user. Before authentication this is only a prompt default.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Unix time at which the current access token expires.
    pub fn expires_at(&self) -> Option<u64> {
        self.auth.as_ref().map(TokenBundle::expires_at)
    }

    /// Restore access from the local cache.
    ///
    /// A corrupt cache is treated as absent. A valid cached token is refreshed
    /// immediately; if that fails the session drops back to unauthenticated and
    /// the caller should prompt for credentials. `user` is kept either way.
    ///
    /// An already authenticated session is left as is, so `user`, `auth` and
    /// the headers always belong to the same grant.
    pub fn load_cached(&mut self) {
        if self.has_access {
            debug!(user = %self.user, "already authenticated, cache not reloaded");
            return;
        }

        let record = match self.store.read_record() {
            Ok(r) => r,
            Err(e) => {
                warn!("ignoring unreadable credential cache: {e}");
                return;
            }
        };

        self.user = record.user.clone();
        let Some(bundle) = record.valid_auth(unix_now()).cloned() else {
            if record.auth.is_some() {
                debug!(user = %self.user, "cached token expired");
            }
            return;
        };

        self.auth = Some(bundle);
        if let Err(e) = self.refresh() {
            info!(user = %self.user, "cached token could not be refreshed: {e}");
            self.clear_access();
        }
    }

    /// Authenticate with the password grant.
    ///
    /// `Ok(())` means headers are ready. A failure to persist the new token
    /// is logged but still returns `Ok(())`: access was granted, only
    /// durability is degraded. On `AuthInvalid` the session is cleared and
    /// the caller may prompt again; on `NetworkError` state is left unchanged.
    pub fn new_access(&mut self, user: &str, password: &str) -> Result<(), AccessError> {
        if user.is_empty() {
            return Err(AccessError::auth_invalid("empty username"));
        }

        let grant = Grant::Password { username: user, password };
        let token = match self.client.request(&self.server, &grant) {
            Ok(t) => t,
            Err(e) if e.kind().is_retryable() => {
                self.clear_access();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let refresh_token = token.refresh_token.clone().ok_or_else(|| {
            AccessError::network("malformed token response: missing field `refresh_token`")
        })?;

        self.user = user.to_owned();
        self.grant(token, refresh_token);
        info!(user = %self.user, "authentication done");
        Ok(())
    }

    /// Exchange the cached refresh token for a new bundle.
    fn refresh(&mut self) -> Result<(), AccessError> {
        let Some(current) = self.auth.as_ref() else {
            return Err(AccessError::network("no token to refresh"));
        };

        let grant =
            Grant::RefreshToken { username: &self.user, refresh_token: &current.refresh_token };
        let token = self.client.request(&self.server, &grant)?;

        let refresh_token =
            token.refresh_token.clone().unwrap_or_else(|| current.refresh_token.clone());
        self.grant(token, refresh_token);
        debug!(user = %self.user, "token refreshed");
        Ok(())
    }

    /// Install a fresh bundle and write it back to the cache.
    fn grant(&mut self, token: TokenResponse, refresh_token: String) {
        let bundle = TokenBundle {
            access_token: token.access_token,
            refresh_token,
            expires_in: token.expires_in,
            created: unix_now(),
        };
        self.headers = make_headers(&bundle.access_token);
        self.has_access = true;
        self.auth = Some(bundle);
        self.persist();
    }

    fn persist(&self) {
        let record = AuthRecord { user: self.user.clone(), auth: self.auth.clone() };
        if let Err(e) = self.store.write_record(&record) {
            warn!(user = %self.user, "access granted but credentials not saved: {e}");
        }
    }

    fn clear_access(&mut self) {
        self.has_access = false;
        self.headers.clear();
        self.auth = None;
    }
}

/// Headers for JSON:API calls with a bearer token.
pub fn make_headers(access_token: &str) -> HashMap<String, String> {
    HashMap::from([
        ("Content-Type".to_owned(), CONTENT_TYPE.to_owned()),
        ("Authorization".to_owned(), format!("Bearer {access_token}")),
    ])
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
