//! Board controller: mirrors remote task status into four columns and
//! applies drag-and-drop moves optimistically.
//!
//! A drop is applied to the local board first, then confirmed with the
//! server. If the server refuses, the exact local mutation is undone and the
//! caller receives an alert to show the user.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use workpulse_core::board::{Board, Column, PendingMove};
use workpulse_core::Task;

use crate::{ServiceError, TaskService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing changed and nothing was sent.
    NoOp,
    /// The server accepted the move.
    Moved(Column),
    /// The server refused; the board is back to how it was before the drop.
    RolledBack { alert: String },
}

pub struct KanbanController<S: TaskService + ?Sized> {
    service: Arc<S>,
    board: Board,
    load_state: LoadState,
    in_flight: HashSet<String>,
}

impl<S: TaskService + ?Sized> KanbanController<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            board: Board::default(),
            load_state: LoadState::Idle,
            in_flight: HashSet::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub fn is_in_flight(&self, card_id: &str) -> bool {
        self.in_flight.contains(card_id)
    }

    /// Replace the board with the server's current task list.
    /// On failure the board is emptied and the load state records the error.
    pub async fn fetch_tasks(&mut self) -> Result<(), ServiceError> {
        self.load_state = LoadState::Loading;
        match self.service.list_manager_tasks().await {
            Ok(tasks) => {
                info!("loaded {} tasks", tasks.len());
                self.board = Board::from_tasks(tasks);
                self.in_flight.clear();
                self.load_state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                warn!("failed to load tasks: {e}");
                self.board = Board::default();
                self.in_flight.clear();
                self.load_state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Handle a drop of `card_id` onto `target`.
    pub async fn on_drag_end(&mut self, card_id: &str, target: Option<Column>) -> DragOutcome {
        let Some(pending) = self.begin_drag(card_id, target) else {
            return DragOutcome::NoOp;
        };
        let result = self
            .service
            .update_task_status(&pending.card_id, pending.to.as_status())
            .await;
        self.finish_drag(pending, result.map(|_| ()))
    }

    /// First half of a drop: mutate the board and mark the card as in flight.
    /// Returns `None` for drops that need no server call.
    pub fn begin_drag(&mut self, card_id: &str, target: Option<Column>) -> Option<PendingMove> {
        if self.in_flight.contains(card_id) {
            debug!("ignoring drop of {card_id}: status update already in flight");
            return None;
        }
        match self.board.begin_move(card_id, target) {
            Ok(Some(pending)) => {
                debug!(
                    "moving {card_id} {} -> {}",
                    pending.from.id(),
                    pending.to.id()
                );
                self.in_flight.insert(card_id.to_string());
                Some(pending)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("drop ignored: {e}");
                None
            }
        }
    }

    /// Second half of a drop: keep the move or undo it.
    pub fn finish_drag(
        &mut self,
        pending: PendingMove,
        result: Result<(), ServiceError>,
    ) -> DragOutcome {
        self.in_flight.remove(&pending.card_id);
        match result {
            Ok(()) => DragOutcome::Moved(pending.to),
            Err(e) => {
                let title = self
                    .board
                    .card(&pending.card_id)
                    .map(|c| c.title.clone())
                    .unwrap_or_else(|| pending.card_id.clone());
                warn!(
                    "status update for {} rejected, rolling back to {}: {e}",
                    pending.card_id,
                    pending.from.id()
                );
                let alert = format!(
                    "Could not move \"{title}\" to {}: {e}",
                    pending.to.display_name()
                );
                self.board.rollback(pending);
                DragOutcome::RolledBack { alert }
            }
        }
    }

    /// Fold a task returned by another mutation (review, reject, checklist)
    /// back into the board.
    pub fn apply_task(&mut self, task: Task) {
        self.board.replace_task(task);
    }
}
