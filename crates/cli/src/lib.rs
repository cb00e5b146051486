// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod fetch;
pub mod login;
pub mod run;

#[cfg(test)]
mod test_support;
