// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mock OAuth2 token endpoint for lifecycle tests.
//!
//! The server runs on its own thread and tokio runtime so tests can drive the
//! blocking client from a plain `#[test]`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Router};

use komlite_core::{ServerConfig, Store, StorePaths};

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into(), delay: Duration::ZERO }
    }

    pub fn token(access: &str, refresh: Option<&str>, expires_in: u64) -> Self {
        let mut body = serde_json::json!({
            "access_token": access,
            "expires_in": expires_in,
            "token_type": "Bearer",
        });
        if let Some(r) = refresh {
            body["refresh_token"] = serde_json::Value::from(r);
        }
        Self::new(200, body.to_string())
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Requests = Arc<Mutex<Vec<HashMap<String, String>>>>;

pub struct MockTokenServer {
    pub addr: SocketAddr,
    requests: Requests,
}

impl MockTokenServer {
    /// Serve `replies` in order, repeating the last one once exhausted.
    pub fn start(replies: Vec<Reply>) -> anyhow::Result<Self> {
        let requests: Requests = Arc::default();
        let recorded = Arc::clone(&requests);
        let replies = Arc::new(replies);

        let app = Router::new().route(
            "/oauth2/token",
            post(move |Form(params): Form<HashMap<String, String>>| {
                let recorded = Arc::clone(&recorded);
                let replies = Arc::clone(&replies);
                async move {
                    let idx = {
                        let mut reqs = recorded.lock().expect("requests lock");
                        reqs.push(params);
                        reqs.len() - 1
                    };
                    let reply = replies
                        .get(idx)
                        .or(replies.last())
                        .cloned()
                        .unwrap_or_else(|| Reply::new(500, "{}"));
                    if !reply.delay.is_zero() {
                        tokio::time::sleep(reply.delay).await;
                    }
                    (
                        StatusCode::from_u16(reply.status)
                            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                        reply.body,
                    )
                }
            }),
        );

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock runtime");
            rt.block_on(async move {
                let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
                    Ok(l) => l,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                };
                let _ = tx.send(listener.local_addr());
                axum::serve(listener, app).await.ok();
            });
        });

        let addr = rx.recv()??;
        Ok(Self { addr, requests })
    }

    pub fn token_url(&self) -> String {
        format!("http://{}/oauth2/token", self.addr)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            server: format!("http://{}", self.addr),
            oauth2_token_url: self.token_url(),
            oauth2_client_id: "test-client".to_owned(),
            oauth2_scope: "komunitin_accounting profile".to_owned(),
        }
    }

    /// Form parameters of every request received so far.
    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }
}

pub fn temp_store(dir: &tempfile::TempDir) -> Store {
    Store::new(StorePaths::in_dir(dir.path().join("komunitin_lite")))
}
