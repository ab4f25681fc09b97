// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::ModuleConfig;

/// A `ModuleConfig` with placeholder identity, for tests that only care
/// about its defaults or want a cheap base to build on with `with_*`.
pub fn sample_module_config() -> ModuleConfig {
    ModuleConfig::new("1.0", "test-module", "test-impl")
}
