// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::{HeaderMap, StatusCode};
use axum::routing::get as get_route;
use axum::Router;

use komlite_core::access::make_headers;

use super::*;
use crate::test_support::{refused_url, spawn_router};

fn api_server() -> anyhow::Result<ServerConfig> {
    let app = Router::new().route(
        "/ces/api/accounts",
        get_route(|headers: HeaderMap| async move {
            let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
            match auth {
                Some("Bearer tok") => (StatusCode::OK, r#"{"data":[]}"#.to_owned()),
                _ => (StatusCode::UNAUTHORIZED, "missing token".to_owned()),
            }
        }),
    );
    let addr = spawn_router(app)?;
    Ok(ServerConfig { server: format!("http://{addr}"), ..ServerConfig::default() })
}

#[test]
fn sends_bearer_header() -> anyhow::Result<()> {
    let server = api_server()?;
    let body = get(&server, &make_headers("tok"), "/ces/api/accounts")?;
    assert_eq!(body, r#"{"data":[]}"#);
    Ok(())
}

#[yare::parameterized(
    wrong_token = { "other", "/ces/api/accounts", "401" },
    unknown_path = { "tok", "/ces/api/nope", "404" },
)]
fn non_success_is_an_error(token: &str, path: &str, expected_substr: &str) {
    let server = match api_server() {
        Ok(s) => s,
        Err(e) => panic!("server: {e}"),
    };
    crate::assert_err_contains!(get(&server, &make_headers(token), path), expected_substr);
}

#[test]
fn unreachable_server_is_an_error() -> anyhow::Result<()> {
    let url = refused_url("")?;
    let server = ServerConfig { server: url, ..ServerConfig::default() };
    let result =
        get_with_timeout(&server, &HashMap::new(), "/ces/api/accounts", Duration::from_millis(500));
    assert!(result.is_err());
    Ok(())
}
