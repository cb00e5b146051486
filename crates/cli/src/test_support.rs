// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: scripted prompts, local HTTP servers, assertions.

use std::collections::VecDeque;
use std::net::SocketAddr;

use crate::login::Prompter;

/// Assert that an expression returns `Err` whose message contains a substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

/// Answers prompts from fixed lists and records what it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    usernames: VecDeque<String>,
    passwords: VecDeque<String>,
    /// Default offered with each username prompt.
    pub defaults: Vec<String>,
    pub reports: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(usernames: &[&str], passwords: &[&str]) -> Self {
        Self {
            usernames: usernames.iter().map(|s| (*s).to_owned()).collect(),
            passwords: passwords.iter().map(|s| (*s).to_owned()).collect(),
            ..Self::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn username(&mut self, default: &str) -> anyhow::Result<String> {
        self.defaults.push(default.to_owned());
        self.usernames.pop_front().ok_or_else(|| anyhow::anyhow!("username script exhausted"))
    }

    fn password(&mut self) -> anyhow::Result<String> {
        self.passwords.pop_front().ok_or_else(|| anyhow::anyhow!("password script exhausted"))
    }

    fn report(&mut self, message: &str) {
        self.reports.push(message.to_owned());
    }
}

/// Serve `app` on an ephemeral port from a background thread.
///
/// The blocking client under test must not run inside a tokio runtime, so the
/// server gets its own.
pub fn spawn_router(app: axum::Router) -> anyhow::Result<SocketAddr> {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        };
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
    Ok(rx.recv()??)
}

/// A URL on a local port nothing listens on.
pub fn refused_url(path: &str) -> anyhow::Result<String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(format!("http://127.0.0.1:{port}{path}"))
}
