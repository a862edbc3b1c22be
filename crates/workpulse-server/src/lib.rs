mod routes;
pub mod seed;
pub mod store;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

pub use routes::{AppState, InnerAppState};
use store::Store;

pub fn app_state(store: Store) -> AppState {
    Arc::new(InnerAppState::new(store))
}

pub fn router(state: AppState) -> Router {
    routes::build_router(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
