use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Runtime;
use workpulse_core::org::{Department, Page};
use workpulse_core::performance::{AiAnalysis, Kpi, PerformanceOverview, ProjectStats};
use workpulse_core::task::{
    CreateTask, NewChecklistItem, NewContent, RejectTask, ReviewTask, Status, Task,
};

use crate::{HttpService, ServiceError, TaskService};

/// Blocking wrapper around the async `HttpService`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the TUI.
pub struct BlockingHttpService {
    inner: Arc<HttpService>,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str) -> Result<Self, ServiceError> {
        Self::from_service(HttpService::new(base_url))
    }

    pub fn with_token(base_url: &str, token: String) -> Result<Self, ServiceError> {
        Self::from_service(HttpService::with_token(base_url, token))
    }

    fn from_service(inner: HttpService) -> Result<Self, ServiceError> {
        let rt = Runtime::new()
            .map_err(|e| ServiceError::Internal(format!("failed to create tokio runtime: {e}")))?;
        Ok(Self {
            inner: Arc::new(inner),
            rt,
        })
    }

    /// Shared handle to the async client, for async callers such as
    /// `KanbanController` that are driven through [`Self::block_on`].
    pub fn shared(&self) -> Arc<HttpService> {
        Arc::clone(&self.inner)
    }

    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.rt.block_on(fut)
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.health_check())
    }

    // -- Trait method delegates --

    pub fn list_manager_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        self.rt.block_on(self.inner.list_manager_tasks())
    }

    pub fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.rt.block_on(self.inner.get_task(id))
    }

    pub fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.rt.block_on(self.inner.create_task(input))
    }

    pub fn update_task_status(&self, id: &str, status: Status) -> Result<Task, ServiceError> {
        self.rt.block_on(self.inner.update_task_status(id, status))
    }

    pub fn review_task(&self, input: &ReviewTask) -> Result<Task, ServiceError> {
        self.rt.block_on(self.inner.review_task(input))
    }

    pub fn reject_task(&self, input: &RejectTask) -> Result<Task, ServiceError> {
        self.rt.block_on(self.inner.reject_task(input))
    }

    pub fn add_checklist_item(
        &self,
        task_id: &str,
        input: &NewChecklistItem,
    ) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.add_checklist_item(task_id, input))
    }

    pub fn set_checklist_item_completed(
        &self,
        task_id: &str,
        item_id: &str,
        completed: bool,
    ) -> Result<Task, ServiceError> {
        self.rt.block_on(
            self.inner
                .set_checklist_item_completed(task_id, item_id, completed),
        )
    }

    pub fn deactivate_checklist_item(
        &self,
        task_id: &str,
        item_id: &str,
    ) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.deactivate_checklist_item(task_id, item_id))
    }

    pub fn add_content(&self, task_id: &str, input: &NewContent) -> Result<Task, ServiceError> {
        self.rt.block_on(self.inner.add_content(task_id, input))
    }

    pub fn deactivate_content(
        &self,
        task_id: &str,
        content_id: &str,
    ) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.deactivate_content(task_id, content_id))
    }

    pub fn upload_task_image(
        &self,
        task_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Task, ServiceError> {
        self.rt
            .block_on(self.inner.upload_task_image(task_id, file_name, bytes))
    }

    // -- Convenience methods --

    pub fn list_departments(&self, page: u32, limit: u32) -> Result<Page<Department>, ServiceError> {
        self.rt.block_on(self.inner.list_departments(page, limit))
    }

    pub fn all_projects_stats(&self) -> Result<Vec<ProjectStats>, ServiceError> {
        self.rt.block_on(self.inner.all_projects_stats())
    }

    pub fn performance_overview(&self) -> Result<PerformanceOverview, ServiceError> {
        self.rt.block_on(self.inner.performance_overview())
    }

    pub fn kpi(&self) -> Result<Vec<Kpi>, ServiceError> {
        self.rt.block_on(self.inner.kpi())
    }

    pub fn ai_analysis(&self) -> Result<AiAnalysis, ServiceError> {
        self.rt.block_on(self.inner.ai_analysis())
    }
}
