//! Kanban board state: four fixed columns derived from task status.
//!
//! The board is rebuilt wholesale from the task list on every fetch. A card
//! move is applied locally first and returns a [`PendingMove`] that can undo
//! exactly that mutation if the server refuses it.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::task::{Priority, Status, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Todo,
    Doing,
    Completed,
    Rejected,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Todo, Column::Doing, Column::Completed, Column::Rejected];

    /// The fixed status → column table. Unknown statuses land in `Todo`.
    pub fn for_status(status: Status) -> Column {
        match status {
            Status::Todo | Status::Overdued | Status::Unknown => Column::Todo,
            Status::Doing => Column::Doing,
            Status::Reviewing | Status::Completed | Status::Feedbacked => Column::Completed,
            Status::Rejected => Column::Rejected,
        }
    }

    /// Status written to the server when a card is dropped on this column.
    pub fn as_status(self) -> Status {
        match self {
            Column::Todo => Status::Todo,
            Column::Doing => Status::Doing,
            Column::Completed => Status::Completed,
            Column::Rejected => Status::Rejected,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Column::Todo => "todo",
            Column::Doing => "doing",
            Column::Completed => "completed",
            Column::Rejected => "rejected",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::Doing => "Doing",
            Column::Completed => "Completed",
            Column::Rejected => "Rejected",
        }
    }

    pub fn from_id(id: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.id() == id)
    }

    pub fn index(self) -> usize {
        match self {
            Column::Todo => 0,
            Column::Doing => 1,
            Column::Completed => 2,
            Column::Rejected => 3,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagColor {
    Green,
    Yellow,
    Red,
}

impl TagColor {
    pub fn for_priority(priority: Priority) -> TagColor {
        match priority {
            Priority::Low => TagColor::Green,
            Priority::Medium => TagColor::Yellow,
            Priority::High => TagColor::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TagColor::Green => "green",
            TagColor::Yellow => "yellow",
            TagColor::Red => "red",
        }
    }
}

/// Display projection of a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub tag: TagColor,
    pub avatars: Vec<String>,
    /// (completed, total) over active checklist items.
    pub checklist: (usize, usize),
    pub comment_count: usize,
    pub file_count: u32,
    pub task: Task,
}

impl Card {
    pub fn from_task(task: Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.name.clone(),
            tag: TagColor::for_priority(task.priority),
            avatars: task
                .assignees
                .iter()
                .filter(|u| !u.avatar.is_empty())
                .map(|u| u.avatar.clone())
                .collect(),
            checklist: task.checklist_progress(),
            comment_count: task.active_contents().count(),
            file_count: task.file_count,
            task,
        }
    }
}

/// Snapshot of a local card move, kept until the server confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub card_id: String,
    pub from: Column,
    /// Ids of the cards that followed this one in `from`, in order.
    pub followers: Vec<String>,
    pub previous_status: Status,
    pub to: Column,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    columns: [Vec<Card>; 4],
}

impl Board {
    /// Partition tasks into columns. Within a column cards are ordered by
    /// due date (undated last), keeping server order for ties.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut board = Board::default();
        for task in tasks {
            let column = Column::for_status(task.status);
            board.columns[column.index()].push(Card::from_task(task));
        }
        for cards in &mut board.columns {
            cards.sort_by(|a, b| by_due_date(&a.task, &b.task));
        }
        board
    }

    pub fn cards(&self, column: Column) -> &[Card] {
        &self.columns[column.index()]
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self, card_id: &str) -> Option<(Column, usize)> {
        Column::ALL.into_iter().find_map(|column| {
            self.cards(column)
                .iter()
                .position(|c| c.id == card_id)
                .map(|idx| (column, idx))
        })
    }

    pub fn column_of(&self, card_id: &str) -> Option<Column> {
        self.position(card_id).map(|(column, _)| column)
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        let (column, idx) = self.position(card_id)?;
        self.cards(column).get(idx)
    }

    /// Apply a drop locally. Returns `None` when there is nothing to do:
    /// no target, or the target is the card's current column.
    pub fn begin_move(
        &mut self,
        card_id: &str,
        target: Option<Column>,
    ) -> Result<Option<PendingMove>, CoreError> {
        let (from, from_index) = self
            .position(card_id)
            .ok_or_else(|| CoreError::NotFound(format!("card {card_id}")))?;
        let Some(to) = target else {
            return Ok(None);
        };
        if to == from {
            return Ok(None);
        }

        let followers = self.columns[from.index()][from_index + 1..]
            .iter()
            .map(|c| c.id.clone())
            .collect();
        let mut card = self.columns[from.index()].remove(from_index);
        let previous_status = card.task.status;
        card.task.status = to.as_status();
        self.columns[to.index()].push(card);

        Ok(Some(PendingMove {
            card_id: card_id.to_string(),
            from,
            followers,
            previous_status,
            to,
        }))
    }

    /// Undo a move made by [`Board::begin_move`]. The card goes back in
    /// front of the first of its old followers still in the column, so
    /// overlapping moves can be undone in any order.
    pub fn rollback(&mut self, pending: PendingMove) {
        let Some((column, idx)) = self.position(&pending.card_id) else {
            return;
        };
        let mut card = self.columns[column.index()].remove(idx);
        card.task.status = pending.previous_status;
        let dest = &mut self.columns[pending.from.index()];
        let at = pending
            .followers
            .iter()
            .find_map(|id| dest.iter().position(|c| &c.id == id))
            .unwrap_or(dest.len());
        dest.insert(at, card);
    }

    /// Swap in a fresh copy of a task returned by the server. If its status
    /// now maps to another column the card moves to the end of that column.
    pub fn replace_task(&mut self, task: Task) {
        let Some((column, idx)) = self.position(&task.id) else {
            return;
        };
        let target = Column::for_status(task.status);
        let card = Card::from_task(task);
        if target == column {
            self.columns[column.index()][idx] = card;
        } else {
            self.columns[column.index()].remove(idx);
            self.columns[target.index()].push(card);
        }
    }
}

fn by_due_date(a: &Task, b: &Task) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::UserRef;
    use chrono::{Duration, TimeZone, Utc};

    fn make_task(id: &str, status: Status) -> Task {
        Task {
            id: id.to_string(),
            name: format!("Task {id}"),
            description: String::new(),
            start_date: None,
            due_date: None,
            status,
            priority: Priority::Medium,
            owner: None,
            assignees: Vec::new(),
            checklist: Vec::new(),
            contents: Vec::new(),
            file_count: 0,
        }
    }

    fn ids(board: &Board, column: Column) -> Vec<&str> {
        board.cards(column).iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn status_table_matches_columns() {
        assert_eq!(Column::for_status(Status::Todo), Column::Todo);
        assert_eq!(Column::for_status(Status::Overdued), Column::Todo);
        assert_eq!(Column::for_status(Status::Unknown), Column::Todo);
        assert_eq!(Column::for_status(Status::Doing), Column::Doing);
        assert_eq!(Column::for_status(Status::Reviewing), Column::Completed);
        assert_eq!(Column::for_status(Status::Completed), Column::Completed);
        assert_eq!(Column::for_status(Status::Feedbacked), Column::Completed);
        assert_eq!(Column::for_status(Status::Rejected), Column::Rejected);
    }

    #[test]
    fn column_status_maps_back_to_same_column() {
        for column in Column::ALL {
            assert_eq!(Column::for_status(column.as_status()), column);
            assert_eq!(Column::from_id(column.id()), Some(column));
        }
        assert_eq!(Column::from_id("backlog"), None);
    }

    #[test]
    fn partitions_mixed_statuses() {
        let board = Board::from_tasks(vec![
            make_task("a", Status::Todo),
            make_task("b", Status::Doing),
            make_task("c", Status::Reviewing),
            make_task("d", Status::Rejected),
            make_task("e", Status::Overdued),
        ]);
        assert_eq!(ids(&board, Column::Todo), vec!["a", "e"]);
        assert_eq!(ids(&board, Column::Doing), vec!["b"]);
        assert_eq!(ids(&board, Column::Completed), vec!["c"]);
        assert_eq!(ids(&board, Column::Rejected), vec!["d"]);
    }

    #[test]
    fn every_task_lands_in_exactly_one_column() {
        let mut statuses = Status::ALL.to_vec();
        statuses.push(Status::Unknown);
        let tasks: Vec<Task> = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| make_task(&format!("t{i}"), *s))
            .collect();
        let board = Board::from_tasks(tasks.clone());

        assert_eq!(board.len(), tasks.len());
        for task in &tasks {
            let hits = Column::ALL
                .into_iter()
                .filter(|c| board.cards(*c).iter().any(|card| card.id == task.id))
                .count();
            assert_eq!(hits, 1, "task {} appears {hits} times", task.id);
            assert_eq!(board.column_of(&task.id), Some(Column::for_status(task.status)));
        }
    }

    #[test]
    fn cards_sorted_by_due_date_undated_last() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut late = make_task("late", Status::Todo);
        late.due_date = Some(base + Duration::days(5));
        let undated = make_task("undated", Status::Todo);
        let mut early = make_task("early", Status::Todo);
        early.due_date = Some(base);

        let board = Board::from_tasks(vec![late, undated, early]);
        assert_eq!(ids(&board, Column::Todo), vec!["early", "late", "undated"]);
    }

    #[test]
    fn card_projection_derives_tag_and_counts() {
        let mut task = make_task("a", Status::Doing);
        task.priority = Priority::High;
        task.file_count = 2;
        task.assignees = vec![
            UserRef {
                id: "u1".into(),
                name: "Ann".into(),
                avatar: "https://img/u1.png".into(),
            },
            UserRef {
                id: "u2".into(),
                name: "Bo".into(),
                avatar: String::new(),
            },
        ];
        let card = Card::from_task(task);
        assert_eq!(card.tag, TagColor::Red);
        assert_eq!(card.avatars, vec!["https://img/u1.png".to_string()]);
        assert_eq!(card.file_count, 2);
        assert_eq!(card.checklist, (0, 0));
    }

    #[test]
    fn tag_colors() {
        assert_eq!(TagColor::for_priority(Priority::Low), TagColor::Green);
        assert_eq!(TagColor::for_priority(Priority::Medium), TagColor::Yellow);
        assert_eq!(TagColor::for_priority(Priority::High), TagColor::Red);
    }

    #[test]
    fn drop_on_same_column_or_nowhere_is_noop() {
        let mut board = Board::from_tasks(vec![make_task("a", Status::Doing)]);
        let before = board.clone();
        assert_eq!(board.begin_move("a", Some(Column::Doing)).unwrap(), None);
        assert_eq!(board.begin_move("a", None).unwrap(), None);
        assert_eq!(board, before);
    }

    #[test]
    fn move_of_unknown_card_is_not_found() {
        let mut board = Board::from_tasks(vec![make_task("a", Status::Doing)]);
        assert!(matches!(
            board.begin_move("zzz", Some(Column::Todo)),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn move_appends_to_target_and_rewrites_status() {
        let mut board = Board::from_tasks(vec![
            make_task("a", Status::Todo),
            make_task("b", Status::Doing),
        ]);
        let pending = board.begin_move("a", Some(Column::Doing)).unwrap().unwrap();
        assert_eq!(pending.from, Column::Todo);
        assert!(pending.followers.is_empty());
        assert_eq!(pending.previous_status, Status::Todo);
        assert_eq!(ids(&board, Column::Doing), vec!["b", "a"]);
        assert!(board.cards(Column::Todo).is_empty());
        assert_eq!(board.card("a").unwrap().task.status, Status::Doing);
    }

    #[test]
    fn rollback_restores_identical_state() {
        let mut board = Board::from_tasks(vec![
            make_task("a", Status::Reviewing),
            make_task("b", Status::Feedbacked),
            make_task("c", Status::Completed),
        ]);
        let before = board.clone();
        let pending = board
            .begin_move("b", Some(Column::Rejected))
            .unwrap()
            .unwrap();
        assert_ne!(board, before);
        board.rollback(pending);
        assert_eq!(board, before);
        assert_eq!(board.card("b").unwrap().task.status, Status::Feedbacked);
    }

    #[test]
    fn overlapping_rollbacks_restore_order_in_any_sequence() {
        let tasks = vec![
            make_task("a", Status::Doing),
            make_task("b", Status::Doing),
            make_task("c", Status::Doing),
        ];
        for undo_first_in_first_out in [true, false] {
            let mut board = Board::from_tasks(tasks.clone());
            let before = board.clone();
            let pa = board.begin_move("a", Some(Column::Rejected)).unwrap().unwrap();
            let pb = board.begin_move("b", Some(Column::Todo)).unwrap().unwrap();
            assert_eq!(pa.followers, vec!["b".to_string(), "c".to_string()]);
            assert_eq!(ids(&board, Column::Doing), vec!["c"]);

            if undo_first_in_first_out {
                board.rollback(pa);
                board.rollback(pb);
            } else {
                board.rollback(pb);
                board.rollback(pa);
            }
            assert_eq!(board, before);
        }
    }

    #[test]
    fn replace_task_relocates_when_status_changes() {
        let mut board = Board::from_tasks(vec![make_task("a", Status::Doing)]);
        let mut updated = make_task("a", Status::Feedbacked);
        updated.name = "Renamed".into();
        board.replace_task(updated);
        assert_eq!(board.column_of("a"), Some(Column::Completed));
        assert_eq!(board.card("a").unwrap().title, "Renamed");
    }
}
