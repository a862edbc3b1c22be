mod blocking;
mod http;
mod kanban;
mod traits;

pub use blocking::BlockingHttpService;
pub use http::HttpService;
pub use kanban::{DragOutcome, KanbanController, LoadState};
pub use traits::{ServiceError, TaskService};
