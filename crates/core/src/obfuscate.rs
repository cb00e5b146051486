// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reversible obfuscation of the local data file.
//!
//! This is NOT encryption. The keyword is hard-coded and shared by every
//! installation; it only keeps tokens from sitting on disk as plain text.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;

use crate::error::StoreError;

/// Keyword shared with files written by earlier releases.
pub const DEFAULT_KEYWORD: &str = "ofuscated";

/// A reversible text transform applied to the data target.
pub trait Obfuscator: Send + Sync + std::fmt::Debug {
    fn encode(&self, clear: &str) -> String;
    fn decode(&self, encoded: &str) -> Result<String, StoreError>;
}

/// Additive stream cipher over code points, modulo 256, then base64 (URL-safe).
///
/// Lossless only for text whose code points are below 256; the store feeds it
/// ASCII-escaped JSON.
#[derive(Debug, Clone)]
pub struct KeywordCipher {
    key: Vec<u32>,
}

impl KeywordCipher {
    pub fn new(keyword: &str) -> Self {
        Self { key: keyword.chars().map(u32::from).collect() }
    }

    fn shift(&self, i: usize) -> u32 {
        if self.key.is_empty() {
            return 0;
        }
        self.key[i % self.key.len()]
    }
}

impl Default for KeywordCipher {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD)
    }
}

impl Obfuscator for KeywordCipher {
    fn encode(&self, clear: &str) -> String {
        let shifted: String = clear
            .chars()
            .enumerate()
            .map(|(i, c)| byte_char((u32::from(c) + self.shift(i)) % 256))
            .collect();
        URL_SAFE.encode(shifted.as_bytes())
    }

    fn decode(&self, encoded: &str) -> Result<String, StoreError> {
        let bytes = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| StoreError::Corrupt(format!("invalid base64: {e}")))?;
        let shifted = String::from_utf8(bytes)
            .map_err(|e| StoreError::Corrupt(format!("invalid utf-8: {e}")))?;
        Ok(shifted
            .chars()
            .enumerate()
            .map(|(i, c)| byte_char((u32::from(c) + 256 - self.shift(i) % 256) % 256))
            .collect())
    }
}

/// Identity transform, used for the plain config target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Obfuscator for Plain {
    fn encode(&self, clear: &str) -> String {
        clear.to_owned()
    }

    fn decode(&self, encoded: &str) -> Result<String, StoreError> {
        Ok(encoded.to_owned())
    }
}

// Every value below 256 is a valid scalar.
fn byte_char(v: u32) -> char {
    char::from_u32(v).unwrap_or('\0')
}

#[cfg(test)]
#[path = "obfuscate_tests.rs"]
mod tests;
