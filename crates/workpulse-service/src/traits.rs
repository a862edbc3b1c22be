use async_trait::async_trait;
use thiserror::Error;
use workpulse_core::task::{
    CreateTask, NewChecklistItem, NewContent, RejectTask, ReviewTask, Status, Task,
};
use workpulse_core::ValidationErrors;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The server answered but reported `success: false`.
    #[error("{0}")]
    Api(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::InvalidInput(errors.to_string())
    }
}

/// The remote task API.
///
/// The board controller and TUI program against this trait.
/// `HttpService` is the real implementation; tests substitute their own.
#[async_trait]
pub trait TaskService: Send + Sync {
    // -- Tasks --
    async fn list_manager_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: &str) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task_status(&self, id: &str, status: Status) -> Result<Task, ServiceError>;
    async fn review_task(&self, input: &ReviewTask) -> Result<Task, ServiceError>;
    async fn reject_task(&self, input: &RejectTask) -> Result<Task, ServiceError>;

    // -- Checklist --
    async fn add_checklist_item(
        &self,
        task_id: &str,
        input: &NewChecklistItem,
    ) -> Result<Task, ServiceError>;
    async fn set_checklist_item_completed(
        &self,
        task_id: &str,
        item_id: &str,
        completed: bool,
    ) -> Result<Task, ServiceError>;
    async fn deactivate_checklist_item(
        &self,
        task_id: &str,
        item_id: &str,
    ) -> Result<Task, ServiceError>;

    // -- Contents --
    async fn add_content(&self, task_id: &str, input: &NewContent) -> Result<Task, ServiceError>;
    async fn deactivate_content(
        &self,
        task_id: &str,
        content_id: &str,
    ) -> Result<Task, ServiceError>;

    // -- Files --
    async fn upload_task_image(
        &self,
        task_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Task, ServiceError>;
}
