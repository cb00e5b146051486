// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth2 token endpoint client: password and refresh-token grants.

use std::sync::Once;
use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::AccessError;

/// Bound on every exchange with the token endpoint.
pub const TOKEN_TIMEOUT: Duration = Duration::from_secs(5);

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Standard OAuth2 token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// The two grants the client performs.
pub enum Grant<'a> {
    Password { username: &'a str, password: &'a str },
    RefreshToken { username: &'a str, refresh_token: &'a str },
}

impl Grant<'_> {
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    fn form<'a>(&'a self, config: &'a ServerConfig) -> Vec<(&'static str, &'a str)> {
        let mut params = vec![("grant_type", self.grant_type())];
        match self {
            Self::Password { username, password } => {
                params.push(("username", *username));
                params.push(("password", *password));
            }
            Self::RefreshToken { username, refresh_token } => {
                params.push(("refresh_token", *refresh_token));
                params.push(("username", *username));
            }
        }
        params.push(("client_id", config.oauth2_client_id.as_str()));
        params.push(("scope", config.oauth2_scope.as_str()));
        params
    }
}

// Never print the password.
impl std::fmt::Debug for Grant<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => {
                f.debug_struct("Password").field("username", username).finish_non_exhaustive()
            }
            Self::RefreshToken { username, .. } => {
                f.debug_struct("RefreshToken").field("username", username).finish_non_exhaustive()
            }
        }
    }
}

/// Blocking client for the authorization endpoint.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: reqwest::blocking::Client,
    timeout: Duration,
}

impl Default for TokenClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenClient {
    pub fn new() -> Self {
        ensure_crypto();
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("komlite/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { http, timeout: TOKEN_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Perform one grant against `config.oauth2_token_url`.
    ///
    /// HTTP 200 with a complete body is success; 401 is `AuthInvalid` carrying
    /// the response body; everything else (transport failure, timeout, other
    /// statuses, malformed body) is `NetworkError`.
    pub fn request(
        &self,
        config: &ServerConfig,
        grant: &Grant<'_>,
    ) -> Result<TokenResponse, AccessError> {
        let grant_type = grant.grant_type();
        debug!(grant_type, url = %config.oauth2_token_url, "requesting token");

        let resp = self
            .http
            .post(&config.oauth2_token_url)
            .timeout(self.timeout)
            .form(&grant.form(config))
            .send()
            .map_err(|e| {
                warn!(grant_type, "token request failed: {e}");
                AccessError::network(e.to_string())
            })?;

        let status = resp.status();
        let body = resp.text().map_err(|e| AccessError::network(format!("read body: {e}")))?;

        match status {
            StatusCode::OK => serde_json::from_str(&body).map_err(|e| {
                warn!(grant_type, "malformed token response: {e}");
                AccessError::network(format!("malformed token response: {e}"))
            }),
            StatusCode::UNAUTHORIZED => {
                info!(grant_type, %status, "authentication rejected");
                Err(AccessError::auth_invalid(body))
            }
            _ => {
                warn!(grant_type, %status, body = %body, "unexpected token endpoint response");
                if body.trim().is_empty() {
                    Err(AccessError::network(format!("HTTP {status}")))
                } else {
                    Err(AccessError::network(body))
                }
            }
        }
    }
}
