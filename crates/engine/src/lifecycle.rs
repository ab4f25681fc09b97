// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The RUNNING -> COMPLETED transition and cancellation
//!
//! `finalize_task` is the single place that performs the completion rename —
//! called by the task child on normal/failed completion, and by the host
//! itself when a task is killed (the child never reaches its own cleanup
//! path once signal-killed).

use modhost_core::{Error, TaskId, TaskOutcome};
use modhost_storage::{StorageRoot, TaskPaths};
use std::path::Path;

use crate::supervisor::Supervisor;

/// Persists `outcome` into `task_dir` and atomically renames it into
/// `completed/`.
///
/// Tolerates the directory already being gone (`NotFound`): the concurrent
/// kill / natural-completion race is resolved by having both sides check for
/// the directory's existence and treating "already renamed by the other
/// side" as success, never an error.
pub fn finalize_task(
    storage: &StorageRoot,
    task_id: &TaskId,
    task_dir: &Path,
    outcome: TaskOutcome,
) -> Result<(), Error> {
    let paths = TaskPaths::for_dir(task_dir);

    let (response, stack_trace) = match outcome {
        TaskOutcome::Success(response) => (response, None),
        TaskOutcome::Failed {
            response,
            stack_trace,
        } => (response, Some(stack_trace)),
    };

    if let Some(trace) = &stack_trace {
        if let Err(e) = std::fs::write(&paths.error_file, trace) {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(Error::internal(format!("failed to write error file: {e}")));
            }
            return Ok(());
        }
    }

    let body = serde_json::to_vec(&response)
        .map_err(|e| Error::internal(format!("failed to serialize response: {e}")))?;
    if let Err(e) = std::fs::write(&paths.response_payload, body) {
        if e.kind() == std::io::ErrorKind::NotFound {
            return Ok(());
        }
        return Err(Error::internal(format!("failed to write response file: {e}")));
    }

    let completed_dir = storage.completed_task_dir(task_id);
    match std::fs::rename(task_dir, &completed_dir) {
        Ok(()) => {
            tracing::info!(task_id = %task_id, "completed");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::internal(format!("failed to complete task: {e}"))),
    }
}

/// Cancels `task_id`: signals its process group, waits for it to exit, then
/// — if it never reached its own completion rename — writes a synthetic
/// cancellation outcome and performs the rename on its behalf.
pub fn kill_task(
    supervisor: &Supervisor,
    storage: &StorageRoot,
    task_id: &TaskId,
) -> Result<(), Error> {
    supervisor.kill(task_id)?;

    let task_dir = storage.running_task_dir(task_id);
    if task_dir.is_dir() {
        finalize_task(storage, task_id, &task_dir, TaskOutcome::cancelled())?;
    }
    Ok(())
}
