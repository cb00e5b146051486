// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use komlite_core::{ServerConfig, Store, StorePaths, Target};

/// Log in to a Komunitin server and keep the session cached locally.
#[derive(Debug, Parser)]
#[command(name = "komlite", version, about)]
pub struct Config {
    /// Directory holding the cached credentials and server config.
    #[arg(long, env = "KOMLITE_DIR")]
    pub dir: Option<PathBuf>,

    /// API base URL (overrides the config file).
    #[arg(long, env = "KOMLITE_SERVER")]
    pub server: Option<String>,

    /// OAuth2 token endpoint (overrides the config file).
    #[arg(long, env = "KOMLITE_TOKEN_URL")]
    pub token_url: Option<String>,

    /// OAuth2 client identifier (overrides the config file).
    #[arg(long, env = "KOMLITE_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth2 scope (overrides the config file).
    #[arg(long, env = "KOMLITE_SCOPE")]
    pub scope: Option<String>,

    /// Username; skips the username prompt.
    #[arg(long, env = "KOMLITE_USER")]
    pub user: Option<String>,

    /// After logging in, GET this API path and print the response.
    #[arg(long)]
    pub get: Option<String>,

    /// Log format (json or text).
    #[arg(long, env = "KOMLITE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "KOMLITE_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }

        for (flag, value) in [("--server", &self.server), ("--token-url", &self.token_url)] {
            if let Some(url) = value {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("{flag} must be an http(s) URL, got {url:?}");
                }
            }
        }

        if self.user.as_deref().is_some_and(|u| u.trim().is_empty()) {
            anyhow::bail!("--user cannot be empty");
        }

        Ok(())
    }

    pub fn store_paths(&self) -> StorePaths {
        match &self.dir {
            Some(dir) => StorePaths::in_dir(dir),
            None => StorePaths::default(),
        }
    }

    /// Load the server config from the store, then apply flag overrides.
    ///
    /// A missing config file is created from the defaults so it can be edited.
    pub fn resolve_server(&self, store: &Store) -> anyhow::Result<ServerConfig> {
        let path = store.path(Target::Config);
        let mut server = if path.exists() {
            store
                .read::<ServerConfig>(Target::Config)
                .with_context(|| format!("loading {}", path.display()))?
        } else {
            let server = ServerConfig::default();
            match store.write(&server, Target::Config) {
                Ok(()) => info!(path = %path.display(), "wrote default server config"),
                Err(e) => warn!("could not save default server config: {e}"),
            }
            server
        };

        if let Some(ref v) = self.server {
            server.server = v.clone();
        }
        if let Some(ref v) = self.token_url {
            server.oauth2_token_url = v.clone();
        }
        if let Some(ref v) = self.client_id {
            server.oauth2_client_id = v.clone();
        }
        if let Some(ref v) = self.scope {
            server.oauth2_scope = v.clone();
        }
        Ok(server)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
