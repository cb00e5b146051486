// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local persistence: the obfuscated data file and the plain config file.
//!
//! Writes go to a scratch file next to the target and are renamed into place,
//! so a reader sees either the old contents or the new. The data file is
//! created owner-only. There is no file locking; concurrent invocations are
//! last-writer-wins.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::obfuscate::{KeywordCipher, Obfuscator};
use crate::paths::StorePaths;

/// The two logical files managed by [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Token and user cache, obfuscated.
    Data,
    /// Server configuration, plain JSON.
    Config,
}

impl Target {
    pub fn is_obfuscated(&self) -> bool {
        matches!(self, Self::Data)
    }
}

/// OAuth2 token bundle as cached on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds, as reported by the server.
    pub expires_in: u64,
    /// Unix seconds, stamped locally when the token was obtained.
    pub created: u64,
}

impl TokenBundle {
    pub fn expires_at(&self) -> u64 {
        self.created.saturating_add(self.expires_in)
    }

    /// A token expiring exactly at `now` is already expired.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.expires_at() > now
    }
}

/// Contents of the data target.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    #[serde(default)]
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<TokenBundle>,
}

impl AuthRecord {
    /// The cached bundle, if present and not expired at `now`.
    pub fn valid_auth(&self, now: u64) -> Option<&TokenBundle> {
        self.auth.as_ref().filter(|a| a.is_valid_at(now))
    }
}

/// Current wall-clock time as unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Reads and writes the store targets under a [`StorePaths`] directory.
#[derive(Debug)]
pub struct Store {
    paths: StorePaths,
    obfuscator: Box<dyn Obfuscator>,
}

impl Store {
    pub fn new(paths: StorePaths) -> Self {
        Self::with_obfuscator(paths, Box::new(KeywordCipher::default()))
    }

    /// Use a different transform for the data target.
    pub fn with_obfuscator(paths: StorePaths, obfuscator: Box<dyn Obfuscator>) -> Self {
        Self { paths, obfuscator }
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn path(&self, target: Target) -> &Path {
        match target {
            Target::Data => &self.paths.data_file,
            Target::Config => &self.paths.config_file,
        }
    }

    /// Scratch file a write to `target` goes through before the rename.
    pub fn staging_path(&self, target: Target) -> PathBuf {
        let path = self.path(target);
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
    }

    /// Read a target. A missing file yields `T::default()`.
    pub fn read<T: DeserializeOwned + Default>(&self, target: Target) -> Result<T, StoreError> {
        let path = self.path(target);
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no local file, using empty record");
                return Ok(T::default());
            }
            Err(e) => {
                warn!(path = %path.display(), "failed to read local file: {e}");
                return Err(StoreError::Corrupt(format!("read {}: {e}", path.display())));
            }
        };

        let json = if target.is_obfuscated() {
            self.obfuscator.decode(&contents).inspect_err(|e| {
                warn!(path = %path.display(), "failed to decode local file: {e}");
            })?
        } else {
            contents
        };

        serde_json::from_str(&json).map_err(|e| {
            warn!(path = %path.display(), "failed to parse local file: {e}");
            StoreError::Corrupt(format!("parse {}: {e}", path.display()))
        })
    }

    /// Serialize `value` into a target, creating the directory on first use.
    pub fn write<T: Serialize>(&self, value: &T, target: Target) -> Result<(), StoreError> {
        let path = self.path(target);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    warn!(path = %parent.display(), "failed to create local directory: {e}");
                    StoreError::Write(format!("create {}: {e}", parent.display()))
                })?;
            }
        }

        let contents = if target.is_obfuscated() {
            let json = serde_json::to_string(value)
                .map_err(|e| StoreError::Write(format!("serialize: {e}")))?;
            self.obfuscator.encode(&escape_non_ascii(&json))
        } else {
            serde_json::to_string_pretty(value)
                .map_err(|e| StoreError::Write(format!("serialize: {e}")))?
        };

        let staging = self.staging_path(target);
        replace_file(&staging, path, &contents, target.is_obfuscated()).map_err(|e| {
            warn!(path = %path.display(), "failed to write local file: {e}");
            StoreError::Write(format!("write {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), "local file written");
        Ok(())
    }

    pub fn read_record(&self) -> Result<AuthRecord, StoreError> {
        self.read(Target::Data)
    }

    pub fn write_record(&self, record: &AuthRecord) -> Result<(), StoreError> {
        self.write(record, Target::Data)
    }
}

/// Escape every non-ASCII char as `\uXXXX` (UTF-16 units).
///
/// Non-ASCII chars only occur inside JSON strings, so the result is equivalent
/// JSON made solely of code points below 128.
fn escape_non_ascii(json: &str) -> String {
    if json.is_ascii() {
        return json.to_owned();
    }
    let mut out = String::with_capacity(json.len() + 16);
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out
}

/// Write `contents` to `staging`, then rename it over `path`.
///
/// A stale staging file is removed first; on failure the staging file is
/// cleaned up and `path` is untouched.
fn replace_file(
    staging: &Path,
    path: &Path,
    contents: &str,
    owner_only: bool,
) -> std::io::Result<()> {
    if staging.is_file() {
        std::fs::remove_file(staging)?;
    }

    let result = (|| {
        let mut file = staging_options(owner_only).open(staging)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(staging, path)
    })();

    if result.is_err() && staging.is_file() {
        let _ = std::fs::remove_file(staging);
    }
    result
}

#[cfg(unix)]
fn staging_options(owner_only: bool) -> std::fs::OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    if owner_only {
        options.mode(0o600);
    }
    options
}

#[cfg(not(unix))]
fn staging_options(_owner_only: bool) -> std::fs::OpenOptions {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    options
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
