// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Failure classes surfaced by the store and the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local file exists but cannot be decoded or parsed.
    Corrupt,
    /// Local directory or file cannot be written.
    WriteError,
    /// The authorization endpoint rejected the credentials (HTTP 401).
    AuthInvalid,
    /// Timeout, connection failure, or any other unexpected response.
    NetworkError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Corrupt => "CORRUPT",
            Self::WriteError => "WRITE_ERROR",
            Self::AuthInvalid => "AUTH_INVALID",
            Self::NetworkError => "NETWORK_ERROR",
        }
    }

    /// Human-readable class prefix used in [`AccessError`] messages.
    ///
    /// Callers may branch on this prefix instead of the full message.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Corrupt => "Storage corrupt",
            Self::WriteError => "Storage write error",
            Self::AuthInvalid => "Wrong credentials",
            Self::NetworkError => "Network Error",
        }
    }

    /// Whether the caller should prompt for credentials again.
    ///
    /// Only rejected credentials are retryable; network errors end the run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AuthInvalid)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Corrupt(String),
    Write(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Corrupt(_) => ErrorKind::Corrupt,
            Self::Write(_) => ErrorKind::WriteError,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            Self::Corrupt(d) | Self::Write(d) => d,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind().prefix(), self.detail())
    }
}

impl std::error::Error for StoreError {}

/// Outcome of a failed grant: a kind discriminant plus detail text.
///
/// Renders as `"<prefix>: <detail>"`, e.g. `"Wrong credentials: invalid_grant"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessError {
    kind: ErrorKind,
    detail: String,
}

impl AccessError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self { kind, detail: detail.into() }
    }

    pub fn auth_invalid(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthInvalid, detail)
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, detail)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.prefix(), self.detail)
    }
}

impl std::error::Error for AccessError {}

impl From<StoreError> for AccessError {
    fn from(e: StoreError) -> Self {
        let kind = e.kind();
        match e {
            StoreError::Corrupt(d) | StoreError::Write(d) => Self::new(kind, d),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
