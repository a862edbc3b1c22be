use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{ok, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/departments", get(list_departments))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_departments(State(state): State<AppState>, Query(q): Query<PageQuery>) -> ApiResult {
    let store = state.store()?;
    Ok(ok(store.departments(q.page.unwrap_or(1), q.limit.unwrap_or(10))))
}
