//! Client-side form checks, run before anything is sent to the server.

use crate::task::{CreateTask, RejectTask, ReviewTask};

pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 2000;
pub const NOTES_MAX: usize = 1000;
pub const REASON_MAX: usize = 500;
pub const QUALITY_SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Per-field messages, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationErrors {
    errors: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `field: message` pairs joined with `; `.
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl CreateTask {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "task name is required");
        } else if char_len(name) < NAME_MIN {
            errors.add("name", format!("must be at least {NAME_MIN} characters"));
        } else if char_len(name) > NAME_MAX {
            errors.add("name", format!("must be at most {NAME_MAX} characters"));
        }

        if char_len(&self.description) > DESCRIPTION_MAX {
            errors.add(
                "description",
                format!("must be at most {DESCRIPTION_MAX} characters"),
            );
        }

        if let (Some(start), Some(due)) = (self.start_date, self.due_date) {
            if due < start {
                errors.add("due_date", "due date must not be before start date");
            }
        }

        errors.into_result()
    }
}

impl ReviewTask {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if !QUALITY_SCORE_RANGE.contains(&self.quality_score) {
            errors.add(
                "quality_score",
                format!(
                    "must be between {} and {}",
                    QUALITY_SCORE_RANGE.start(),
                    QUALITY_SCORE_RANGE.end()
                ),
            );
        }
        if char_len(&self.notes) > NOTES_MAX {
            errors.add("notes", format!("must be at most {NOTES_MAX} characters"));
        }
        errors.into_result()
    }
}

impl RejectTask {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.reason.trim().is_empty() {
            errors.add("reason", "a rejection reason is required");
        } else if char_len(&self.reason) > REASON_MAX {
            errors.add("reason", format!("must be at most {REASON_MAX} characters"));
        }
        if char_len(&self.notes) > NOTES_MAX {
            errors.add("notes", format!("must be at most {NOTES_MAX} characters"));
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::{Duration, Utc};

    fn create(name: &str) -> CreateTask {
        CreateTask {
            name: name.into(),
            description: String::new(),
            start_date: None,
            due_date: None,
            priority: Priority::Medium,
            assignee_ids: Vec::new(),
        }
    }

    #[test]
    fn create_task_requires_name() {
        let err = create("   ").validate().unwrap_err();
        assert_eq!(err.get("name"), Some("task name is required"));
        assert!(create("ab").validate().unwrap_err().get("name").is_some());
        assert!(create("Write report").validate().is_ok());
    }

    #[test]
    fn create_task_rejects_due_before_start() {
        let now = Utc::now();
        let mut input = create("Quarterly review");
        input.start_date = Some(now);
        input.due_date = Some(now - Duration::days(1));
        let err = input.validate().unwrap_err();
        assert!(err.get("due_date").is_some());

        input.due_date = Some(now);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn errors_accumulate_and_display_in_order() {
        let mut input = create("");
        input.description = "x".repeat(DESCRIPTION_MAX + 1);
        let err = input.validate().unwrap_err();
        assert_eq!(err.iter().count(), 2);
        assert_eq!(
            err.to_string(),
            "name: task name is required; description: must be at most 2000 characters"
        );
    }

    #[test]
    fn review_score_bounds() {
        let mut review = ReviewTask {
            task_id: "t1".into(),
            task_owner_id: "u1".into(),
            quality_score: 0,
            notes: String::new(),
        };
        assert!(review.validate().is_err());
        review.quality_score = 11;
        assert!(review.validate().is_err());
        review.quality_score = 10;
        assert!(review.validate().is_ok());
    }

    #[test]
    fn reject_requires_reason() {
        let mut reject = RejectTask {
            task_id: "t1".into(),
            reason: " ".into(),
            notes: String::new(),
        };
        assert!(reject.validate().unwrap_err().get("reason").is_some());
        reject.reason = "Missing attachments".into();
        assert!(reject.validate().is_ok());
    }
}
