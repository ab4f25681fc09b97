// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The task-child entry point
//!
//! When the host re-executes its own binary with [`crate::RUN_TASK_ENV`]
//! set, control lands here instead of the HTTP server. This process invokes
//! the module author's callback, persists its outcome, and performs the
//! completion rename — then exits. It never returns.

use crate::lifecycle::finalize_task;
use crate::{STORAGE_ROOT_ENV, TASK_ID_ENV};
use modhost_core::{Json, TaskCallback, TaskId, TaskOutcome};
use modhost_storage::{StorageRoot, TaskPaths};
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Runs exactly one task to completion and exits the process.
///
/// `callback` is the same `fn` item the host's `main` passed to
/// `modhost-server::run` — available again here because this process is a
/// re-exec of that very binary, not a fork.
pub fn run_as_task_child(callback: TaskCallback) -> ! {
    let Ok(task_id) = std::env::var(TASK_ID_ENV) else {
        eprintln!("{TASK_ID_ENV} not set; a task child must be launched by the supervisor");
        std::process::exit(1);
    };
    let task_id = TaskId::from_raw(task_id);

    let Ok(storage_root) = std::env::var(STORAGE_ROOT_ENV) else {
        eprintln!("{STORAGE_ROOT_ENV} not set; a task child must be launched by the supervisor");
        std::process::exit(1);
    };
    let storage = StorageRoot::attach(storage_root);

    let task_dir = storage.running_task_dir(&task_id);
    let paths = TaskPaths::for_dir(&task_dir);
    let log_path = storage.log_path(&task_id);

    let outcome = run_callback(callback, &paths, &log_path);
    let _ = finalize_task(&storage, &task_id, &task_dir, outcome);

    std::process::exit(0);
}

fn run_callback(
    callback: TaskCallback,
    paths: &TaskPaths,
    log_path: &std::path::Path,
) -> TaskOutcome {
    let payload: Json = match std::fs::read_to_string(&paths.request_payload)
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
    {
        Some(v) => v,
        None => {
            return TaskOutcome::from_unexpected(
                "failed to read back requestJsonPayload".to_string(),
                "failed to read back requestJsonPayload".to_string(),
            );
        }
    };

    let blob_names = std::fs::read_dir(&paths.wd)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        callback(&payload, &paths.wd, &blob_names, log_path, &paths.result)
    }));

    match result {
        Ok(Ok(response)) => TaskOutcome::Success(response),
        Ok(Err(module_err)) => {
            let trace = format!("{module_err}");
            TaskOutcome::from_module_error(module_err, trace)
        }
        Err(panic_payload) => {
            let message = panic_message(&panic_payload);
            TaskOutcome::from_unexpected(message.clone(), message)
        }
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "module callback panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modhost_core::ModuleError;
    use tempfile::tempdir;

    fn ok_callback(
        payload: &Json,
        _wd: &std::path::Path,
        _blobs: &[String],
        _log: &std::path::Path,
        _result: &std::path::Path,
    ) -> Result<Json, ModuleError> {
        Ok(serde_json::json!({"echo": payload}))
    }

    fn failing_callback(
        _payload: &Json,
        _wd: &std::path::Path,
        _blobs: &[String],
        _log: &std::path::Path,
        _result: &std::path::Path,
    ) -> Result<Json, ModuleError> {
        Err(ModuleError::new("bad template", serde_json::json!({"template": "foo"})))
    }

    fn panicking_callback(
        _payload: &Json,
        _wd: &std::path::Path,
        _blobs: &[String],
        _log: &std::path::Path,
        _result: &std::path::Path,
    ) -> Result<Json, ModuleError> {
        panic!("unexpected failure");
    }

    fn setup() -> (tempfile::TempDir, TaskPaths, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let task_dir = dir.path().join("t_x");
        let paths = modhost_storage::task::prepare_running_task(
            &{
                std::fs::create_dir(&task_dir).unwrap();
                task_dir.clone()
            },
            &serde_json::json!({"x": 1}),
            Vec::<(String, std::io::Cursor<Vec<u8>>)>::new(),
        )
        .unwrap();
        let log_path = dir.path().join("t_x.txt");
        (dir, paths, log_path)
    }

    #[test]
    fn success_outcome_echoes_payload() {
        let (_dir, paths, log_path) = setup();
        match run_callback(ok_callback, &paths, &log_path) {
            TaskOutcome::Success(v) => assert_eq!(v["echo"]["x"], 1),
            TaskOutcome::Failed { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn module_error_outcome_carries_error_data() {
        let (_dir, paths, log_path) = setup();
        match run_callback(failing_callback, &paths, &log_path) {
            TaskOutcome::Failed {
                response,
                stack_trace,
            } => {
                assert_eq!(response["message"], "bad template");
                assert_eq!(response["errorData"]["template"], "foo");
                assert_eq!(stack_trace, "bad template");
            }
            TaskOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn panic_is_caught_and_reported_without_error_data() {
        let (_dir, paths, log_path) = setup();
        match run_callback(panicking_callback, &paths, &log_path) {
            TaskOutcome::Failed { response, .. } => {
                assert_eq!(response["message"], "unexpected failure");
                assert!(response.get("errorData").is_none());
            }
            TaskOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
