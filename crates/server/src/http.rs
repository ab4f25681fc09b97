// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform HTTP wire contract
//!
//! `/info`, `/submit`, `/state/:id`, `/kill/:id`, `/log/:id`,
//! `/result/:id/:file` — see the specification's wire contract table. Every
//! handler stays a thin translation from HTTP onto `modhost-storage` /
//! `modhost-engine` operations; no lifecycle logic lives here.

use axum::body::Body;
use axum::extract::{Multipart, Path as PathParam, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json as AxumJson, Router};
use modhost_core::{Error as CoreError, Json, ModuleConfig, TaskId};
use modhost_engine::Supervisor;
use modhost_storage::task::{self, DiskState};
use modhost_storage::{log, CapacityGate, StorageRoot};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state every handler reads through.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ModuleConfig>,
    storage: Arc<StorageRoot>,
    capacity: Arc<CapacityGate>,
    supervisor: Supervisor,
    /// The binary the supervisor re-executes to run one task. Always
    /// `current_exe()` in production; tests point it at a fixture binary.
    exe: Arc<PathBuf>,
}

impl AppState {
    pub fn new(config: ModuleConfig, storage: StorageRoot, exe: PathBuf) -> Self {
        let capacity = CapacityGate::new(config.max_tasks);
        Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            capacity: Arc::new(capacity),
            supervisor: Supervisor::new(),
            exe: Arc::new(exe),
        }
    }
}

/// Builds the router. `debug` mirrors `-D/--debug`: on top of the
/// always-on method/uri/status/latency spans from `TraceLayer`, it installs
/// a middleware that logs full request/response bodies at `debug` level.
pub fn router(state: AppState, debug: bool) -> Router {
    let router = Router::new()
        .route("/info", get(get_info))
        .route("/submit", post(submit))
        .route("/state/:id", get(get_state))
        .route("/kill/:id", get(kill))
        .route("/log/:id", get(get_log))
        .route("/result/:id/:file", get(get_result))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    if debug {
        router.layer(middleware::from_fn(log_body_if_debug)).with_state(state)
    } else {
        router.with_state(state)
    }
}

/// Buffers and logs the full request and response bodies at `debug` level.
/// Only installed when `-D/--debug` is set — body logging is expensive and
/// not appropriate for a host's default operational log.
async fn log_body_if_debug(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(%e, "failed to buffer request body for debug logging");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    tracing::debug!(body = %String::from_utf8_lossy(&bytes), "request body");
    let request = Request::from_parts(parts, Body::from(bytes));

    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(%e, "failed to buffer response body for debug logging");
            return Response::from_parts(parts, Body::empty());
        }
    };
    tracing::debug!(body = %String::from_utf8_lossy(&bytes), "response body");
    Response::from_parts(parts, Body::from(bytes))
}

/// Wraps [`modhost_core::Error`] so handlers can return it directly via `?`.
struct ApiError(CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, AxumJson(serde_json::json!({ "message": self.0.message }))).into_response()
    }
}

#[derive(Serialize)]
struct InfoResponse {
    #[serde(rename = "apiVersion")]
    api_version: String,
    #[serde(rename = "moduleName")]
    module_name: String,
    #[serde(rename = "implementationName")]
    implementation_name: String,
    #[serde(rename = "runningTasks")]
    running_tasks: usize,
    #[serde(rename = "maxTasks")]
    max_tasks: usize,
}

async fn get_info(State(state): State<AppState>) -> AxumJson<InfoResponse> {
    AxumJson(InfoResponse {
        api_version: state.config.api_version.clone(),
        module_name: state.config.module_name.clone(),
        implementation_name: state.config.implementation_name.clone(),
        running_tasks: state.storage.count_running(),
        max_tasks: state.capacity.max_tasks(),
    })
}

#[derive(Serialize)]
struct SubmitResponse {
    #[serde(rename = "taskId")]
    task_id: String,
}

async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<AxumJson<SubmitResponse>, ApiError> {
    let mut payload: Option<Json> = None;
    let mut blobs: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoreError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| CoreError::bad_request(format!("failed reading multipart field: {e}")))?;

        if name == "jsonPayload" {
            let text = String::from_utf8(data.to_vec()).map_err(|e| {
                CoreError::bad_request(format!("jsonPayload is not valid utf-8: {e}"))
            })?;
            let value: Json = serde_json::from_str(&text).map_err(|e| {
                CoreError::bad_request(format!("Unable to parse JSON from request field. Error: {e}"))
            })?;
            payload = Some(value);
        } else if !name.is_empty() {
            blobs.push((name, data.to_vec()));
        }
    }

    let Some(payload) = payload else {
        return Err(
            CoreError::bad_request("'jsonPayload' file not found within the POST request").into(),
        );
    };

    let task_id = TaskId::new();
    let task_dir = state.capacity.reserve(&state.storage, &task_id)?;

    let readers: Vec<(String, std::io::Cursor<Vec<u8>>)> = blobs
        .into_iter()
        .map(|(name, bytes)| (name, std::io::Cursor::new(bytes)))
        .collect();

    let prepare_dir = task_dir.clone();
    let prepare_payload = payload.clone();
    let prepared = tokio::task::spawn_blocking(move || {
        task::prepare_running_task(&prepare_dir, &prepare_payload, readers)
    })
    .await
    .map_err(|e| CoreError::internal(format!("task setup panicked: {e}")))?;

    if let Err(e) = prepared {
        task::remove_path_best_effort(&task_dir);
        return Err(CoreError::internal(format!("Failed to store request data. Error: {e}")).into());
    }

    let log_path = state.storage.log_path(&task_id);
    if let Err(e) = log::create_empty(&log_path) {
        task::remove_path_best_effort(&task_dir);
        return Err(CoreError::internal(format!("Failed to create log file. Error: {e}")).into());
    }

    if let Err(e) = state
        .supervisor
        .spawn(&state.exe, task_id.clone(), state.storage.root())
    {
        task::remove_path_best_effort(&task_dir);
        return Err(e.into());
    }

    Ok(AxumJson(SubmitResponse {
        task_id: task_id.to_string(),
    }))
}

async fn get_state(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<AxumJson<Json>, ApiError> {
    let task_id = TaskId::from_raw(id);
    let storage = state.storage.clone();
    let disk_state = {
        let task_id = task_id.clone();
        tokio::task::spawn_blocking(move || task::read_state(&storage, &task_id))
            .await
            .map_err(|e| CoreError::internal(format!("state lookup panicked: {e}")))?
    };

    let body = match disk_state {
        DiskState::Running => serde_json::json!({ "state": "RUNNING" }),
        DiskState::CompletedOk { response, blobs } => {
            serde_json::json!({ "state": "COMPLETED", "blobs": blobs, "response": response })
        }
        DiskState::CompletedFailed {
            mut response,
            stack_trace,
        } => {
            merge_into_object(&mut response, "state", Json::String("FAILED".to_string()));
            merge_into_object(&mut response, "stackTrace", Json::String(stack_trace));
            response
        }
        DiskState::ServerError { message } => {
            serde_json::json!({ "state": "SERVER_ERROR", "message": message })
        }
        DiskState::Unknown => {
            return Err(
                CoreError::not_found(format!("task with ID: '{task_id}' not found.")).into(),
            );
        }
    };

    Ok(AxumJson(body))
}

fn merge_into_object(value: &mut Json, key: &str, new_value: Json) {
    if let Json::Object(map) = value {
        map.insert(key.to_string(), new_value);
    }
}

async fn kill(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<AxumJson<Json>, ApiError> {
    let task_id = TaskId::from_raw(id);
    let storage = state.storage.clone();
    let supervisor = state.supervisor.clone();

    tokio::task::spawn_blocking(move || modhost_engine::kill_task(&supervisor, &storage, &task_id))
        .await
        .map_err(|e| CoreError::internal(format!("kill panicked: {e}")))??;

    Ok(AxumJson(serde_json::json!({})))
}

#[derive(Deserialize)]
struct LogQuery {
    offset: Option<u64>,
}

async fn get_log(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    Query(query): Query<LogQuery>,
) -> Result<Vec<u8>, ApiError> {
    let task_id = TaskId::from_raw(id);
    let log_path = state.storage.log_path(&task_id);
    let offset = query.offset.unwrap_or(0);

    tokio::task::spawn_blocking(move || log::read_log_from_offset(&log_path, offset))
        .await
        .map_err(|e| CoreError::internal(format!("log read panicked: {e}")))?
        .map_err(|_| CoreError::not_found(format!("logs for task with ID: '{task_id}' not found")).into())
}

async fn get_result(
    State(state): State<AppState>,
    PathParam((id, file)): PathParam<(String, String)>,
) -> Result<Vec<u8>, ApiError> {
    let task_id = TaskId::from_raw(id);

    if file.contains('/') || file.contains("..") {
        return Err(CoreError::not_found(format!(
            "unable to find result file: '{file}' for task with ID: '{task_id}'"
        ))
        .into());
    }

    let completed_dir = state.storage.completed_task_dir(&task_id);
    if !completed_dir.is_dir() {
        return Err(CoreError::not_found(format!(
            "task with ID: '{task_id}' not found or not completed."
        ))
        .into());
    }

    let file_path = completed_dir.join("result").join(&file);
    tokio::fs::read(&file_path).await.map_err(|_| {
        CoreError::not_found(format!(
            "unable to find result file: '{file}' for task with ID: '{task_id}'"
        ))
        .into()
    })
}
