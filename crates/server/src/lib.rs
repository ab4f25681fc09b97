// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! modhost-server: the HTTP facade
//!
//! Five endpoints (`/info`, `/submit`, `/state/:id`, `/kill/:id`, `/log/:id`,
//! `/result/:id/:file`) bound to the storage and supervisor layers behind a
//! uniform wire contract. [`run`] is the single entry point a module
//! author's `main` calls.

pub mod cli;
pub mod http;
pub mod run;

pub use http::AppState;
pub use run::run;
