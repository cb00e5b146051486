// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Location of the local data and config files.

use std::path::{Path, PathBuf};

const DIR_NAME: &str = ".komunitin_lite";
const DATA_FILE: &str = "data";
const CONFIG_FILE: &str = "config";

/// Files backing the two store targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub dir: PathBuf,
    pub data_file: PathBuf,
    pub config_file: PathBuf,
}

impl StorePaths {
    /// Standard file names under `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self { data_file: dir.join(DATA_FILE), config_file: dir.join(CONFIG_FILE), dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for StorePaths {
    fn default() -> Self {
        Self::in_dir(app_dir())
    }
}

/// Resolve the per-user application directory.
///
/// Checks `KOMLITE_DIR`, then `$HOME/.komunitin_lite`, then `./.komunitin_lite`.
pub fn app_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KOMLITE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DIR_NAME);
    }
    PathBuf::from(DIR_NAME)
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
