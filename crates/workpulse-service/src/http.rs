use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use workpulse_core::org::{Department, Page};
use workpulse_core::performance::{AiAnalysis, Kpi, PerformanceOverview, ProjectStats};
use workpulse_core::task::{
    CreateTask, NewChecklistItem, NewContent, RejectTask, ReviewTask, Status, Task,
    ToggleChecklistItem, UpdateStatus,
};

use crate::{ServiceError, TaskService};

/// Extra attempts for GETs that fail to connect or time out.
const READ_RETRIES: u32 = 2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Every JSON response from the backend is wrapped in this.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

/// Async HTTP client implementation of TaskService.
pub struct HttpService {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url,
            client,
            token: None,
        }
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::new(base_url)
        }
    }

    /// Replace the default 15 s per-request timeout.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or(self.client);
        Self { client, ..self }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt = 0;
        let resp = loop {
            debug!("GET {url}");
            match self.with_auth(self.client.get(&url)).send().await {
                Ok(resp) => break resp,
                Err(e) if attempt < READ_RETRIES && (e.is_connect() || e.is_timeout()) => {
                    attempt += 1;
                    warn!("GET {url} failed ({e}), retry {attempt}/{READ_RETRIES}");
                }
                Err(e) => return Err(ServiceError::Internal(e.to_string())),
            }
        };
        handle_response(resp).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .with_auth(builder.json(body))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("POST {path}");
        let builder = self.client.post(format!("{}{path}", self.base_url));
        self.send_json(builder, body).await
    }

    async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        debug!("PATCH {path}");
        let builder = self.client.patch(format!("{}{path}", self.base_url));
        self.send_json(builder, body).await
    }

    async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        debug!("DELETE {path}");
        let builder = self.client.delete(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    // -- Organisation and reporting (not on trait) --

    pub async fn list_departments(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Page<Department>, ServiceError> {
        self.get_json(&format!("/departments?page={page}&limit={limit}"))
            .await
    }

    pub async fn all_projects_stats(&self) -> Result<Vec<ProjectStats>, ServiceError> {
        self.get_json("/performance/all-projects-stats").await
    }

    pub async fn performance_overview(&self) -> Result<PerformanceOverview, ServiceError> {
        self.get_json("/performance/overview").await
    }

    pub async fn kpi(&self) -> Result<Vec<Kpi>, ServiceError> {
        self.get_json("/performance/kpi").await
    }

    pub async fn ai_analysis(&self) -> Result<AiAnalysis, ServiceError> {
        self.get_json("/performance/ai-analysis").await
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ServiceError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(parse_error_with_status(status, resp).await);
    }
    let envelope = resp
        .json::<Envelope<T>>()
        .await
        .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))?;
    unwrap_envelope(envelope)
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, ServiceError> {
    if !envelope.success {
        return Err(ServiceError::Api(
            envelope.message.unwrap_or_else(|| "request failed".into()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ServiceError::Internal("response has no data".into()))
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v["message"]
                .as_str()
                .or_else(|| v["error"].as_str())
                .map(String::from)
        })
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::InvalidInput(msg)
        }
        s if s.is_server_error() => ServiceError::Internal(msg),
        _ => ServiceError::Api(msg),
    }
}

#[async_trait]
impl TaskService for HttpService {
    async fn list_manager_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        self.get_json("/tasks?scope=manager").await
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.get_json(&format!("/tasks/{id}")).await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        input.validate()?;
        self.post_json("/tasks", input).await
    }

    async fn update_task_status(&self, id: &str, status: Status) -> Result<Task, ServiceError> {
        self.patch_json(&format!("/tasks/{id}/status"), &UpdateStatus { status })
            .await
    }

    async fn review_task(&self, input: &ReviewTask) -> Result<Task, ServiceError> {
        input.validate()?;
        self.post_json(&format!("/tasks/{}/review", input.task_id), input)
            .await
    }

    async fn reject_task(&self, input: &RejectTask) -> Result<Task, ServiceError> {
        input.validate()?;
        self.post_json(&format!("/tasks/{}/reject", input.task_id), input)
            .await
    }

    async fn add_checklist_item(
        &self,
        task_id: &str,
        input: &NewChecklistItem,
    ) -> Result<Task, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "title: checklist item title is required".into(),
            ));
        }
        self.post_json(&format!("/tasks/{task_id}/checklist"), input)
            .await
    }

    async fn set_checklist_item_completed(
        &self,
        task_id: &str,
        item_id: &str,
        completed: bool,
    ) -> Result<Task, ServiceError> {
        self.patch_json(
            &format!("/tasks/{task_id}/checklist/{item_id}"),
            &ToggleChecklistItem {
                is_completed: completed,
            },
        )
        .await
    }

    async fn deactivate_checklist_item(
        &self,
        task_id: &str,
        item_id: &str,
    ) -> Result<Task, ServiceError> {
        self.delete_json(&format!("/tasks/{task_id}/checklist/{item_id}"))
            .await
    }

    async fn add_content(&self, task_id: &str, input: &NewContent) -> Result<Task, ServiceError> {
        if input.content.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "content: comment must not be empty".into(),
            ));
        }
        self.post_json(&format!("/tasks/{task_id}/contents"), input)
            .await
    }

    async fn deactivate_content(
        &self,
        task_id: &str,
        content_id: &str,
    ) -> Result<Task, ServiceError> {
        self.delete_json(&format!("/tasks/{task_id}/contents/{content_id}"))
            .await
    }

    async fn upload_task_image(
        &self,
        task_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Task, ServiceError> {
        debug!("POST /tasks/{task_id}/image ({} bytes)", bytes.len());
        let form = Form::new().part(
            "taskImage",
            Part::bytes(bytes).file_name(file_name.to_string()),
        );
        let builder = self
            .client
            .post(format!("{}/tasks/{task_id}/image", self.base_url))
            .multipart(form);
        let resp = self
            .with_auth(builder)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_yields_data() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":true,"data":[1,2]}"#).unwrap();
        assert_eq!(unwrap_envelope(env).unwrap(), vec![1, 2]);
    }

    #[test]
    fn envelope_failure_is_api_error() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success":false,"message":"not your task"}"#).unwrap();
        match unwrap_envelope(env) {
            Err(ServiceError::Api(msg)) => assert_eq!(msg, "not your task"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn envelope_without_data_is_internal() {
        let env: Envelope<Vec<u32>> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(matches!(unwrap_envelope(env), Err(ServiceError::Internal(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let svc = HttpService::new("http://localhost:3720/api/");
        assert_eq!(svc.base_url(), "http://localhost:3720/api");
    }
}
