// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER: &str = "https://demo.integralces.net";
pub const DEFAULT_TOKEN_URL: &str = "https://demo.integralces.net/oauth2/token";
pub const DEFAULT_CLIENT_ID: &str = "odoo-pos-komunitin";
pub const DEFAULT_SCOPE: &str = "komunitin_accounting komunitin_social profile offline_access";

/// Remote server settings, stored as the plain config target.
///
/// Missing keys fall back to the demo server defaults; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the API.
    pub server: String,
    pub oauth2_token_url: String,
    pub oauth2_client_id: String,
    pub oauth2_scope: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_owned(),
            oauth2_token_url: DEFAULT_TOKEN_URL.to_owned(),
            oauth2_client_id: DEFAULT_CLIENT_ID.to_owned(),
            oauth2_scope: DEFAULT_SCOPE.to_owned(),
        }
    }
}

impl ServerConfig {
    /// Join `path` onto the API base URL.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.server.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
