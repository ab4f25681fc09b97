// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The callback contract a module author implements
//!
//! A module is a single function: it consumes a structured request plus an
//! uploaded bundle of files, and produces a structured response plus optional
//! output files. The host invokes it under a fixed interface and never looks
//! inside it.

use crate::Json;
use std::fmt;
use std::path::Path;

/// A domain-level failure the callback raises deliberately.
///
/// Distinct from an unexpected panic: `error_data` is surfaced verbatim to
/// the client in the `FAILED` response, alongside `message`.
#[derive(Debug, Clone)]
pub struct ModuleError {
    pub message: String,
    pub error_data: Json,
}

impl ModuleError {
    pub fn new(message: impl Into<String>, error_data: Json) -> Self {
        Self {
            message: message.into(),
            error_data,
        }
    }
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ModuleError {}

/// The function signature every module author implements.
///
/// - `payload`: the parsed `jsonPayload` submitted with the task.
/// - `work_dir`: pre-populated with every uploaded blob, named by part name.
/// - `blob_names`: the names of the blobs placed under `work_dir`.
/// - `log_path`: where the callback should write its progress log.
/// - `result_dir`: where the callback writes output files, to be exposed as
///   result blobs once the task completes.
///
/// A plain function pointer (not a closure) by design: the host achieves
/// process isolation by re-executing its own binary rather than forking, so
/// the callback must be something the re-executed process can reach again —
/// a named `fn`, not captured state. See `modhost-engine`'s supervisor.
pub type TaskCallback = fn(
    payload: &Json,
    work_dir: &Path,
    blob_names: &[String],
    log_path: &Path,
    result_dir: &Path,
) -> Result<Json, ModuleError>;

/// The outcome of one callback invocation, already shaped for persistence.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// The callback returned normally.
    Success(Json),
    /// The callback raised a `ModuleError`, or panicked, or the task was
    /// cancelled. `stack_trace` is the plaintext `error` file content.
    Failed {
        response: Json,
        stack_trace: String,
    },
}

impl TaskOutcome {
    /// Builds the outcome for a deliberate domain error.
    pub fn from_module_error(err: ModuleError, stack_trace: String) -> Self {
        let response = serde_json::json!({
            "message": err.message,
            "errorData": err.error_data,
        });
        TaskOutcome::Failed {
            response,
            stack_trace,
        }
    }

    /// Builds the outcome for an unexpected panic (no `errorData` attached).
    pub fn from_unexpected(message: String, stack_trace: String) -> Self {
        let response = serde_json::json!({ "message": message });
        TaskOutcome::Failed {
            response,
            stack_trace,
        }
    }

    /// Builds the outcome for a user-initiated cancellation.
    pub fn cancelled() -> Self {
        TaskOutcome::Failed {
            response: serde_json::json!({}),
            stack_trace: "Task cancelled by user".to_string(),
        }
    }
}
