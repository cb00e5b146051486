// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated GET against the API, used by `--get`.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use komlite_core::oauth::{ensure_crypto, TOKEN_TIMEOUT};
use komlite_core::ServerConfig;

/// GET `path` on the API server with the session headers and return the body.
pub fn get(
    server: &ServerConfig,
    headers: &HashMap<String, String>,
    path: &str,
) -> anyhow::Result<String> {
    get_with_timeout(server, headers, path, TOKEN_TIMEOUT)
}

pub fn get_with_timeout(
    server: &ServerConfig,
    headers: &HashMap<String, String>,
    path: &str,
    timeout: Duration,
) -> anyhow::Result<String> {
    ensure_crypto();
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;

    let url = server.api_url(path);
    let mut request = client.get(&url);
    for (name, value) in headers {
        request = request.header(name.as_str(), value.as_str());
    }

    let resp = request.send()?;
    let status = resp.status();
    let body = resp.text()?;
    debug!(%url, %status, "api response");
    if !status.is_success() {
        anyhow::bail!("server returned {status}: {body}");
    }
    Ok(body)
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
