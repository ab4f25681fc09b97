// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal module used as both a worked example and the re-exec target for
//! this workspace's integration tests.
//!
//! `jsonPayload` selects behavior via a `"mode"` key:
//! - `"echo"` (default): returns the payload, writes one blob per uploaded
//!   file into `result/`, and logs each step.
//! - `"fail"`: raises a [`ModuleError`] carrying `errorData` from the payload.
//! - `"panic"`: panics, to exercise the unexpected-failure path.
//! - `"sleep"`: sleeps for `"seconds"` (default 60), to give tests something
//!   to kill mid-run.

use modhost_core::{Json, ModuleConfig, ModuleError};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

fn log_line(log_path: &Path, line: &str) {
    if let Ok(mut file) = OpenOptions::new().append(true).open(log_path) {
        let _ = writeln!(file, "{line}");
    }
}

fn demo_callback(
    payload: &Json,
    work_dir: &Path,
    blob_names: &[String],
    log_path: &Path,
    result_dir: &Path,
) -> Result<Json, ModuleError> {
    let mode = payload.get("mode").and_then(Json::as_str).unwrap_or("echo");
    log_line(log_path, &format!("starting task in mode '{mode}'"));

    match mode {
        "fail" => {
            let error_data = payload
                .get("errorData")
                .cloned()
                .unwrap_or(serde_json::json!({}));
            Err(ModuleError::new("demo module failed intentionally", error_data))
        }
        "panic" => {
            panic!("demo module panicked intentionally");
        }
        "sleep" => {
            let seconds = payload.get("seconds").and_then(Json::as_u64).unwrap_or(60);
            for elapsed in 0..seconds {
                std::thread::sleep(Duration::from_secs(1));
                log_line(log_path, &format!("slept {elapsed} of {seconds}s"));
            }
            Ok(serde_json::json!({ "slept": seconds }))
        }
        _ => {
            for name in blob_names {
                let src = work_dir.join(name);
                let dst = result_dir.join(name);
                if let Err(e) = std::fs::copy(&src, &dst) {
                    log_line(log_path, &format!("failed to copy blob '{name}': {e}"));
                }
            }
            log_line(log_path, "done");
            Ok(serde_json::json!({ "echo": payload, "blobs": blob_names }))
        }
    }
}

fn main() {
    let config = ModuleConfig::new("1.0", "demo-module", "modhost-demo")
        .with_storage_path("./demo-storage")
        .with_max_tasks(0)
        .with_default_port(5055);
    modhost_server::run(demo_callback, config);
}
