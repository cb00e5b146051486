// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential lifecycle for a Komunitin API client.
//!
//! [`ApiAccess`] restores a cached OAuth2 token, refreshes it, or performs
//! the password grant, and persists the result through a lightly obfuscated
//! [`Store`].

pub mod access;
pub mod config;
pub mod error;
pub mod oauth;
pub mod obfuscate;
pub mod paths;
pub mod store;

pub use access::ApiAccess;
pub use config::ServerConfig;
pub use error::{AccessError, ErrorKind, StoreError};
pub use paths::StorePaths;
pub use store::{AuthRecord, Store, Target, TokenBundle};
