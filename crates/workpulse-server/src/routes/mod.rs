pub mod departments;
pub mod health;
pub mod performance;
pub mod tasks;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::StatusCode;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use workpulse_service::ServiceError;

use crate::store::Store;

pub struct InnerAppState {
    pub store: Mutex<Store>,
    /// When set, `PATCH /tasks/{id}/status` fails with a 500.
    pub fail_status_updates: AtomicBool,
}

impl InnerAppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
            fail_status_updates: AtomicBool::new(false),
        }
    }

    pub fn set_fail_status_updates(&self, fail: bool) {
        self.fail_status_updates.store(fail, Ordering::SeqCst);
    }

    pub fn store(&self) -> Result<MutexGuard<'_, Store>, ApiError> {
        self.store
            .lock()
            .map_err(|_| to_error(ServiceError::Internal("store lock poisoned".into())))
    }
}

pub type AppState = Arc<InnerAppState>;

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult = Result<Json<Value>, ApiError>;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(health::routes())
        .merge(tasks::routes())
        .merge(departments::routes())
        .merge(performance::routes());

    // Browser clients are served from another origin.
    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub fn to_error(e: ServiceError) -> ApiError {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Api(_) => StatusCode::CONFLICT,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(json!({ "success": false, "message": e.to_string() })),
    )
}
