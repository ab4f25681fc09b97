// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! modhost-core: shared types for the module host
//!
//! A module host exposes a uniform HTTP contract for submitting long-running
//! compute tasks, tracking their lifecycle, and retrieving results. This crate
//! carries the types and contracts every other crate in the workspace builds
//! on: task identity, the callback contract a module author implements, the
//! error taxonomy, and host configuration.

pub mod callback;
pub mod config;
pub mod error;
pub mod id;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use callback::{ModuleError, TaskCallback, TaskOutcome};
pub use config::ModuleConfig;
pub use error::{Error, ErrorKind};
pub use id::TaskId;

/// Arbitrary tree-shaped JSON value exchanged with module authors and clients.
///
/// The host never imposes a fixed schema on request/response payloads —
/// schema validation is the concern of downstream tooling, not this crate.
pub type Json = serde_json::Value;
