// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task directory layout and disk-state inference
//!
//! Lifecycle state is never held in memory — it is inferred from which
//! directory a task lives under, and what that directory contains. See the
//! data model in the specification for the exact disk signatures.

use crate::layout::StorageRoot;
use modhost_core::{Json, TaskId};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Paths inside one task's working directory (`running/<id>` while live, or
/// `completed/<id>` once moved).
#[derive(Debug, Clone)]
pub struct TaskPaths {
    pub task_dir: PathBuf,
    pub wd: PathBuf,
    pub result: PathBuf,
    pub request_payload: PathBuf,
    pub response_payload: PathBuf,
    pub error_file: PathBuf,
}

impl TaskPaths {
    pub fn for_dir(task_dir: impl Into<PathBuf>) -> Self {
        let task_dir = task_dir.into();
        Self {
            wd: task_dir.join("wd"),
            result: task_dir.join("result"),
            request_payload: task_dir.join("requestJsonPayload"),
            response_payload: task_dir.join("responseJsonPayload"),
            error_file: task_dir.join("error"),
            task_dir,
        }
    }
}

/// Creates `wd/`, `result/`, writes `requestJsonPayload`, and invokes
/// `write_blob` once per `(name, reader)` pair to copy blob bytes into `wd/`.
pub fn prepare_running_task<R: Read>(
    task_dir: &Path,
    payload: &Json,
    blobs: impl IntoIterator<Item = (String, R)>,
) -> std::io::Result<TaskPaths> {
    let paths = TaskPaths::for_dir(task_dir);
    std::fs::create_dir(&paths.wd)?;
    std::fs::create_dir(&paths.result)?;

    for (name, mut reader) in blobs {
        let mut file = std::fs::File::create(paths.wd.join(&name))?;
        std::io::copy(&mut reader, &mut file)?;
    }

    std::fs::write(&paths.request_payload, serde_json::to_vec(payload)?)?;
    Ok(paths)
}

/// Lists the files a callback wrote into `result/`, for the `blobs` field of
/// a COMPLETED response.
pub fn list_result_blobs(result_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(result_dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Disk-inferred lifecycle state, as surfaced by `/state/:id`.
#[derive(Debug, Clone, PartialEq)]
pub enum DiskState {
    Running,
    CompletedOk {
        response: Json,
        blobs: Vec<String>,
    },
    CompletedFailed {
        response: Json,
        stack_trace: String,
    },
    /// `responseJsonPayload` exists on disk but failed to parse as JSON.
    ServerError {
        message: String,
    },
    Unknown,
}

/// Reads the lifecycle state of `id` from disk.
///
/// Checks `running/` first, then `completed/` — never the reverse. A task
/// transitioning through the completion rename would otherwise risk being
/// observed in neither location if `completed/` were checked first.
pub fn read_state(storage: &StorageRoot, id: &TaskId) -> DiskState {
    if storage.running_task_dir(id).is_dir() {
        return DiskState::Running;
    }

    let completed_dir = storage.completed_task_dir(id);
    let response_path = completed_dir.join("responseJsonPayload");
    let Ok(raw) = std::fs::read_to_string(&response_path) else {
        return DiskState::Unknown;
    };

    let response: Json = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            return DiskState::ServerError {
                message: format!("Failed to decode json response: {e}"),
            };
        }
    };

    let error_path = completed_dir.join("error");
    if let Ok(stack_trace) = std::fs::read_to_string(&error_path) {
        return DiskState::CompletedFailed {
            response,
            stack_trace,
        };
    }

    let blobs = list_result_blobs(&completed_dir.join("result")).unwrap_or_default();
    DiskState::CompletedOk { response, blobs }
}

/// Best-effort recursive removal, mirroring `shutil.rmtree(ignore_errors=True)`.
pub fn remove_path_best_effort(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}
