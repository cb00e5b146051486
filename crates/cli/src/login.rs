// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive login: cached session first, then username/password prompts.

use std::io::{BufRead, Write};

use tracing::debug;

use komlite_core::{AccessError, ApiAccess};

/// Source of credentials and sink for user-facing messages.
pub trait Prompter {
    /// Ask for a username. An empty answer means "use `default`".
    fn username(&mut self, default: &str) -> anyhow::Result<String>;
    fn password(&mut self) -> anyhow::Result<String>;
    fn report(&mut self, message: &str);
}

/// Prompts on the controlling terminal; the password is read without echo.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn username(&mut self, default: &str) -> anyhow::Result<String> {
        let prompt = if default.is_empty() {
            "User: ".to_owned()
        } else {
            format!("User: ({default}): ")
        };
        let mut stdout = std::io::stdout();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line)? == 0 {
            anyhow::bail!("no username given (end of input)");
        }
        Ok(line.trim().to_owned())
    }

    fn password(&mut self) -> anyhow::Result<String> {
        Ok(rpassword::prompt_password("Password: ")?)
    }

    fn report(&mut self, message: &str) {
        println!("{message}");
    }
}

/// How the login loop ended.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated,
    /// A network or server failure; the run should stop.
    Aborted(AccessError),
}

/// Restore the cached session or prompt until the credentials are accepted.
///
/// Rejected credentials are reported and prompted again. A network error
/// ends the loop with [`LoginOutcome::Aborted`]. `preset_user` skips the
/// username prompt.
pub fn login(
    access: &mut ApiAccess,
    prompter: &mut dyn Prompter,
    preset_user: Option<&str>,
) -> anyhow::Result<LoginOutcome> {
    access.load_cached();
    if access.has_access() {
        debug!(user = access.user(), "using cached session");
        return Ok(LoginOutcome::Authenticated);
    }

    loop {
        let user = match preset_user {
            Some(u) => u.to_owned(),
            None => {
                let answer = prompter.username(access.user())?;
                if answer.is_empty() {
                    access.user().to_owned()
                } else {
                    answer
                }
            }
        };
        if user.is_empty() {
            prompter.report(&AccessError::auth_invalid("empty username").to_string());
            continue;
        }
        let password = prompter.password()?;

        match access.new_access(&user, &password) {
            Ok(()) => return Ok(LoginOutcome::Authenticated),
            Err(e) if e.kind().is_retryable() => prompter.report(&e.to_string()),
            Err(e) => return Ok(LoginOutcome::Aborted(e)),
        }
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
