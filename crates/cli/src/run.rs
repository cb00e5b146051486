// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level runner, shared by `main` and tests.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use komlite_core::{ApiAccess, Store};

use crate::config::Config;
use crate::fetch;
use crate::login::{login, LoginOutcome, Prompter, TerminalPrompter};

/// Initialize tracing/logging from config.
///
/// Uses `try_init` so it's safe to call multiple times (e.g. from tests).
/// Logs go to stderr to keep stdout for prompts and API output.
pub fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init(),
    };
    drop(result);
}

/// Log in on the terminal and run the optional `--get`. Returns the exit code.
pub fn run(config: Config) -> anyhow::Result<i32> {
    run_with(&config, &mut TerminalPrompter)
}

pub fn run_with(config: &Config, prompter: &mut dyn Prompter) -> anyhow::Result<i32> {
    let store = Store::new(config.store_paths());
    let server = config.resolve_server(&store)?;
    info!(server = %server.server, dir = %store.paths().dir().display(), "starting");

    let mut access = ApiAccess::with_store(server, store);
    match login(&mut access, prompter, config.user.as_deref())? {
        LoginOutcome::Aborted(e) => {
            error!("login aborted: {e}");
            prompter.report(&e.to_string());
            return Ok(1);
        }
        LoginOutcome::Authenticated => {}
    }
    prompter.report(&format!("Authenticated as {}", access.user()));

    if let Some(ref path) = config.get {
        let body = fetch::get(access.server(), access.headers(), path)?;
        println!("{body}");
    }
    Ok(0)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
