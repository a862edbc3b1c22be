use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    Doing,
    Reviewing,
    Rejected,
    Completed,
    Feedbacked,
    Overdued,
    /// Anything the backend sends that this client does not know about.
    #[serde(other)]
    Unknown,
}

impl Status {
    pub const ALL: &[Status] = &[
        Status::Todo,
        Status::Doing,
        Status::Reviewing,
        Status::Rejected,
        Status::Completed,
        Status::Feedbacked,
        Status::Overdued,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::Doing => "doing",
            Status::Reviewing => "reviewing",
            Status::Rejected => "rejected",
            Status::Completed => "completed",
            Status::Feedbacked => "feedbacked",
            Status::Overdued => "overdued",
            Status::Unknown => "unknown",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Status::Todo => "To Do",
            Status::Doing => "Doing",
            Status::Reviewing => "Reviewing",
            Status::Rejected => "Rejected",
            Status::Completed => "Completed",
            Status::Feedbacked => "Feedbacked",
            Status::Overdued => "Overdue",
            Status::Unknown => "Unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(Status::Todo),
            "doing" => Some(Status::Doing),
            "reviewing" => Some(Status::Reviewing),
            "rejected" => Some(Status::Rejected),
            "completed" => Some(Status::Completed),
            "feedbacked" => Some(Status::Feedbacked),
            "overdued" => Some(Status::Overdued),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    High,
    /// Also what unrecognised priorities read as.
    #[default]
    #[serde(other)]
    Medium,
}

impl Priority {
    pub const ALL: &[Priority] = &[Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A reference to a user as embedded in task payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

/// Reads an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    /// Items are deactivated, never removed.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// A comment or note attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContent {
    #[serde(alias = "_id")]
    pub id: String,
    pub user: UserRef,
    pub content: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: Priority,
    #[serde(default)]
    pub owner: Option<UserRef>,
    #[serde(default)]
    pub assignees: Vec<UserRef>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub contents: Vec<TaskContent>,
    #[serde(default)]
    pub file_count: u32,
}

impl Task {
    pub fn active_checklist(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.checklist.iter().filter(|c| c.is_active)
    }

    /// (completed, total) over active checklist items.
    pub fn checklist_progress(&self) -> (usize, usize) {
        self.active_checklist().fold((0, 0), |(done, total), item| {
            (done + usize::from(item.is_completed), total + 1)
        })
    }

    pub fn active_contents(&self) -> impl Iterator<Item = &TaskContent> {
        self.contents.iter().filter(|c| c.is_active)
    }

    /// The user a review is credited to: the owner, else the first assignee.
    pub fn owner_id(&self) -> Option<&str> {
        self.owner
            .as_ref()
            .or_else(|| self.assignees.first())
            .map(|u| u.id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatus {
    pub status: Status,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewTask {
    pub task_id: String,
    pub task_owner_id: String,
    pub quality_score: u8,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectTask {
    pub task_id: String,
    pub reason: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChecklistItem {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleChecklistItem {
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContent {
    pub user_id: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in Status::ALL {
            assert_eq!(Status::from_str(status.as_str()), Some(*status));
        }
        assert_eq!(Status::from_str("archived"), None);
    }

    #[test]
    fn unknown_status_deserializes_instead_of_failing() {
        let task: Task =
            serde_json::from_str(r#"{"_id":"t1","name":"x","status":"archived"}"#).unwrap();
        assert_eq!(task.id, "t1");
        assert_eq!(task.status, Status::Unknown);
    }

    #[test]
    fn null_status_lands_in_default_instead_of_failing_the_list() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[{"id":"a","name":"x","status":null},{"id":"b","name":"y","status":"doing"}]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, Status::Todo);
        assert_eq!(tasks[1].status, Status::Doing);
    }

    #[test]
    fn unrecognised_or_null_priority_reads_as_medium() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[{"id":"a","name":"x","priority":"urgent"},
                {"id":"b","name":"y","priority":null},
                {"id":"c","name":"z","priority":"high"}]"#,
        )
        .unwrap();
        assert_eq!(tasks[0].priority, Priority::Medium);
        assert_eq!(tasks[1].priority, Priority::Medium);
        assert_eq!(tasks[2].priority, Priority::High);
        assert_eq!(serde_json::to_string(&Priority::Medium).unwrap(), r#""medium""#);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let task: Task = serde_json::from_str(r#"{"id":"t1","name":"x"}"#).unwrap();
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.assignees.is_empty());
        assert!(task.checklist.is_empty());
        assert_eq!(task.file_count, 0);
    }

    #[test]
    fn checklist_progress_ignores_inactive_items() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "x",
            "checklist": [
                {"id": "a", "title": "a", "is_completed": true},
                {"id": "b", "title": "b", "is_completed": false},
                {"id": "c", "title": "c", "is_completed": true, "is_active": false},
            ]
        }))
        .unwrap();
        assert_eq!(task.checklist_progress(), (1, 2));
    }

    #[test]
    fn owner_id_falls_back_to_first_assignee() {
        let mut task: Task = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "x",
            "assignees": [{"id": "u2", "name": "Bo"}, {"id": "u3"}]
        }))
        .unwrap();
        assert_eq!(task.owner_id(), Some("u2"));

        task.owner = Some(UserRef {
            id: "u1".into(),
            name: "Ann".into(),
            avatar: String::new(),
        });
        assert_eq!(task.owner_id(), Some("u1"));
    }
}
