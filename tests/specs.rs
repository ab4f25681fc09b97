// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests driving the module host entirely through its HTTP
//! contract, using the `demo-module` binary as the real re-exec target so
//! tasks run in genuinely separate, killable OS processes.

use modhost_core::ModuleConfig;
use modhost_server::http::{router, AppState};
use modhost_storage::StorageRoot;
use reqwest::multipart;
use std::time::Duration;
use tempfile::tempdir;
use tokio::net::TcpListener;

fn demo_module_exe() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_demo-module"))
}

/// Boots a module host bound to an ephemeral port and returns its base URL.
async fn spawn_host(max_tasks: usize) -> (String, tempfile::TempDir) {
    let dir = tempdir().expect("tempdir");
    let storage = StorageRoot::init(dir.path().join("data")).expect("storage init");
    let config = ModuleConfig::new("1.0", "demo-module", "modhost-demo")
        .with_storage_path(dir.path().join("data"))
        .with_max_tasks(max_tasks);
    let state = AppState::new(config, storage, demo_module_exe());
    let app = router(state, false);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}"), dir)
}

async fn submit(base: &str, payload: serde_json::Value, blobs: &[(&str, &[u8])]) -> reqwest::Response {
    let mut form = multipart::Form::new().part(
        "jsonPayload",
        multipart::Part::text(payload.to_string()).mime_str("application/json").unwrap(),
    );
    for (name, bytes) in blobs {
        form = form.part(name.to_string(), multipart::Part::bytes(bytes.to_vec()));
    }
    reqwest::Client::new()
        .post(format!("{base}/submit"))
        .multipart(form)
        .send()
        .await
        .expect("submit request")
}

async fn poll_until_not_running(base: &str, task_id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let body: serde_json::Value = reqwest::get(format!("{base}/state/{task_id}"))
            .await
            .expect("state request")
            .json()
            .await
            .expect("state json");
        if body["state"] != "RUNNING" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("task {task_id} never left RUNNING");
}

#[tokio::test]
async fn info_reports_module_identity_and_capacity() {
    let (base, _dir) = spawn_host(0).await;
    let info: serde_json::Value = reqwest::get(format!("{base}/info"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(info["moduleName"], "demo-module");
    assert_eq!(info["maxTasks"], 0);
    assert_eq!(info["runningTasks"], 0);
}

#[tokio::test]
async fn happy_path_echoes_payload_and_blobs() {
    let (base, _dir) = spawn_host(0).await;
    let resp = submit(&base, serde_json::json!({"mode": "echo", "n": 7}), &[("input.bin", b"hi")]).await;
    assert_eq!(resp.status(), 200);
    let submitted: serde_json::Value = resp.json().await.unwrap();
    let task_id = submitted["taskId"].as_str().unwrap().to_string();

    let state = poll_until_not_running(&base, &task_id).await;
    assert_eq!(state["state"], "COMPLETED");
    assert_eq!(state["response"]["echo"]["n"], 7);
    assert_eq!(state["blobs"], serde_json::json!(["input.bin"]));

    let result = reqwest::get(format!("{base}/result/{task_id}/input.bin"))
        .await
        .unwrap();
    assert_eq!(result.status(), 200);
    assert_eq!(result.bytes().await.unwrap().as_ref(), b"hi");
}

#[tokio::test]
async fn domain_failure_surfaces_error_data_and_stack_trace() {
    let (base, _dir) = spawn_host(0).await;
    let resp = submit(
        &base,
        serde_json::json!({"mode": "fail", "errorData": {"template": "bad-input"}}),
        &[],
    )
    .await;
    let submitted: serde_json::Value = resp.json().await.unwrap();
    let task_id = submitted["taskId"].as_str().unwrap().to_string();

    let state = poll_until_not_running(&base, &task_id).await;
    assert_eq!(state["state"], "FAILED");
    assert_eq!(state["message"], "demo module failed intentionally");
    assert_eq!(state["errorData"]["template"], "bad-input");
    assert!(state["stackTrace"].as_str().unwrap().contains("demo module failed"));
}

#[tokio::test]
async fn unexpected_panic_is_reported_without_error_data() {
    let (base, _dir) = spawn_host(0).await;
    let resp = submit(&base, serde_json::json!({"mode": "panic"}), &[]).await;
    let submitted: serde_json::Value = resp.json().await.unwrap();
    let task_id = submitted["taskId"].as_str().unwrap().to_string();

    let state = poll_until_not_running(&base, &task_id).await;
    assert_eq!(state["state"], "FAILED");
    assert!(state.get("errorData").is_none());
}

#[tokio::test]
async fn capacity_limit_refuses_a_second_concurrent_task() {
    let (base, _dir) = spawn_host(1).await;
    let first = submit(&base, serde_json::json!({"mode": "sleep", "seconds": 5}), &[]).await;
    assert_eq!(first.status(), 200);

    let second = submit(&base, serde_json::json!({"mode": "echo"}), &[]).await;
    assert_eq!(second.status(), 503);
}

#[tokio::test]
async fn kill_terminates_a_running_task() {
    let (base, _dir) = spawn_host(0).await;
    let resp = submit(&base, serde_json::json!({"mode": "sleep", "seconds": 60}), &[]).await;
    let submitted: serde_json::Value = resp.json().await.unwrap();
    let task_id = submitted["taskId"].as_str().unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let kill_resp = reqwest::Client::new()
        .get(format!("{base}/kill/{task_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(kill_resp.status(), 200);

    let state = poll_until_not_running(&base, &task_id).await;
    assert_eq!(state["state"], "FAILED");
    assert_eq!(state["stackTrace"], "Task cancelled by user");
}

#[tokio::test]
async fn unknown_task_id_is_a_404() {
    let (base, _dir) = spawn_host(0).await;
    let resp = reqwest::get(format!("{base}/state/t_does-not-exist")).await.unwrap();
    assert_eq!(resp.status(), 404);

    let resp = reqwest::Client::new()
        .get(format!("{base}/kill/t_does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn storage_root_is_wiped_of_stale_running_tasks_on_startup() {
    let dir = tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir_all(data_dir.join("running/t_stale")).unwrap();

    let storage = StorageRoot::init(&data_dir).unwrap();
    assert_eq!(storage.count_running(), 0);
    assert!(!data_dir.join("running/t_stale").exists());
}
