// Copyright 2026 The Leabra Authors
// SPDX-License-Identifier: Apache-2.0

//! # Leabra Observability
//!
//! Shared logging setup for the Leabra crates, built on `tracing`.
//! Simulations call [`init_logging`] (or [`init_default`]) once at startup;
//! the `RUST_LOG` environment variable overrides the configured level.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod init;

pub use config::{LogFormat, LoggingConfig};
pub use init::{init_default, init_logging};
