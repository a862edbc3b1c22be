use std::sync::atomic::Ordering;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, warn};
use workpulse_core::task::{
    CreateTask, NewChecklistItem, NewContent, RejectTask, ReviewTask, ToggleChecklistItem,
    UpdateStatus,
};
use workpulse_service::ServiceError;

use super::{ok, to_error, ApiError, ApiResult, AppState};

const IMAGE_FIELD: &str = "taskImage";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(get_task))
        .route("/tasks/{id}/status", patch(update_status))
        .route("/tasks/{id}/review", post(review_task))
        .route("/tasks/{id}/reject", post(reject_task))
        .route("/tasks/{id}/checklist", post(add_checklist_item))
        .route(
            "/tasks/{id}/checklist/{item_id}",
            patch(toggle_checklist_item).delete(deactivate_checklist_item),
        )
        .route("/tasks/{id}/contents", post(add_content))
        .route(
            "/tasks/{id}/contents/{content_id}",
            delete(deactivate_content),
        )
        .route("/tasks/{id}/image", post(upload_image))
}

/// Every caller is treated as a manager, so `?scope=manager` does not filter.
async fn list_tasks(State(state): State<AppState>) -> ApiResult {
    let store = state.store()?;
    Ok(ok(store.list_tasks()))
}

async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.store()?;
    store.get_task(&id).map(ok).map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let task = state.store()?.create_task(&input).map_err(to_error)?;
    info!("created task {}", task.id);
    Ok((StatusCode::CREATED, ok(task)))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatus>,
) -> ApiResult {
    if state.fail_status_updates.load(Ordering::SeqCst) {
        warn!("refusing status update for {id}: failure injection enabled");
        return Err(to_error(ServiceError::Internal(
            "status updates are temporarily unavailable".into(),
        )));
    }
    let task = state
        .store()?
        .update_status(&id, input.status)
        .map_err(to_error)?;
    info!("task {id} -> {}", task.status.as_str());
    Ok(ok(task))
}

fn check_path_matches(path_id: &str, body_id: &str) -> Result<(), ApiError> {
    if path_id == body_id {
        Ok(())
    } else {
        Err(to_error(ServiceError::InvalidInput(
            "task_id does not match the path".into(),
        )))
    }
}

async fn review_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ReviewTask>,
) -> ApiResult {
    check_path_matches(&id, &input.task_id)?;
    let mut store = state.store()?;
    store.review(&id, &input).map(ok).map_err(to_error)
}

async fn reject_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RejectTask>,
) -> ApiResult {
    check_path_matches(&id, &input.task_id)?;
    let mut store = state.store()?;
    store.reject(&id, &input).map(ok).map_err(to_error)
}

async fn add_checklist_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<NewChecklistItem>,
) -> ApiResult {
    let mut store = state.store()?;
    store
        .add_checklist_item(&id, &input)
        .map(ok)
        .map_err(to_error)
}

async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
    Json(input): Json<ToggleChecklistItem>,
) -> ApiResult {
    let mut store = state.store()?;
    store
        .set_checklist_item_completed(&id, &item_id, input.is_completed)
        .map(ok)
        .map_err(to_error)
}

async fn deactivate_checklist_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = state.store()?;
    store
        .deactivate_checklist_item(&id, &item_id)
        .map(ok)
        .map_err(to_error)
}

async fn add_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<NewContent>,
) -> ApiResult {
    let mut store = state.store()?;
    store
        .add_content(&id, &input)
        .map(ok)
        .map_err(to_error)
}

async fn deactivate_content(
    State(state): State<AppState>,
    Path((id, content_id)): Path<(String, String)>,
) -> ApiResult {
    let mut store = state.store()?;
    store
        .deactivate_content(&id, &content_id)
        .map(ok)
        .map_err(to_error)
}

async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> ApiResult {
    let bad_form = |e: axum::extract::multipart::MultipartError| {
        to_error(ServiceError::InvalidInput(format!("multipart: {e}")))
    };
    let mut size = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        if field.name() == Some(IMAGE_FIELD) {
            let data = field.bytes().await.map_err(bad_form)?;
            size = Some(data.len());
        }
    }
    let size = size.ok_or_else(|| {
        to_error(ServiceError::InvalidInput(format!(
            "missing `{IMAGE_FIELD}` field"
        )))
    })?;
    let task = state.store()?.record_upload(&id, size).map_err(to_error)?;
    info!("stored {size} byte image for task {id}");
    Ok(ok(task))
}
