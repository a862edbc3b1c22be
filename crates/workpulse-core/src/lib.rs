pub mod board;
pub mod error;
pub mod org;
pub mod performance;
pub mod task;
pub mod timer;
pub mod validation;

pub use board::{Board, Card, Column, PendingMove, TagColor};
pub use error::CoreError;
pub use task::{Priority, Status, Task};
pub use timer::{TickOutcome, Timer, TimerMode};
pub use validation::ValidationErrors;
