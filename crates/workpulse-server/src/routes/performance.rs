use axum::{extract::State, routing::get, Router};
use chrono::Utc;

use super::{ok, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/performance/all-projects-stats", get(all_projects_stats))
        .route("/performance/overview", get(overview))
        .route("/performance/kpi", get(kpi))
        .route("/performance/ai-analysis", get(ai_analysis))
}

async fn all_projects_stats(State(state): State<AppState>) -> ApiResult {
    let store = state.store()?;
    Ok(ok(store.project_stats(Utc::now())))
}

async fn overview(State(state): State<AppState>) -> ApiResult {
    let store = state.store()?;
    Ok(ok(store.overview(Utc::now())))
}

async fn kpi(State(state): State<AppState>) -> ApiResult {
    let store = state.store()?;
    Ok(ok(store.kpi(Utc::now())))
}

async fn ai_analysis(State(state): State<AppState>) -> ApiResult {
    let store = state.store()?;
    Ok(ok(store.ai_analysis(Utc::now())))
}
