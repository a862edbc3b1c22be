use chrono::Utc;
use tokio::net::TcpListener;

use crate::store::Store;
use crate::{app_state, seed, AppState};

/// A running test server with base_url and background task handle.
pub struct TestServer {
    /// Includes the `/api` prefix, e.g. "http://127.0.0.1:12345/api".
    pub base_url: String,
    pub state: AppState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn set_fail_status_updates(&self, fail: bool) {
        self.state.set_fail_status_updates(fail);
    }
}

/// Spawn a server with the user roster but no tasks.
pub async fn spawn_test_server() -> TestServer {
    spawn_with_store(Store::new(seed::roster())).await
}

/// Spawn a server loaded with the demo data set.
pub async fn spawn_seeded_test_server() -> TestServer {
    spawn_with_store(seed::demo_store(Utc::now())).await
}

/// Spawn an axum test server on a random port.
pub async fn spawn_with_store(store: Store) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}/api");
    let state = app_state(store);
    let app = crate::router(state.clone());
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        state,
        _handle: handle,
    }
}
