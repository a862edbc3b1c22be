//! In-memory backing store for the stand-in server.
//!
//! Tasks are never deleted: rejection is a status, and checklist items and
//! comments are soft-deactivated.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use workpulse_core::org::{Department, Page};
use workpulse_core::performance::{AiAnalysis, Kpi, PerformanceOverview, ProjectStats};
use workpulse_core::task::{
    ChecklistItem, CreateTask, NewChecklistItem, NewContent, RejectTask, ReviewTask, Status, Task,
    TaskContent, UserRef,
};
use workpulse_service::ServiceError;

#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub task_id: String,
    pub task_owner_id: String,
    pub quality_score: u8,
    pub notes: String,
    pub reviewed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RejectionRecord {
    pub task_id: String,
    pub reason: String,
    pub notes: String,
    pub rejected_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Store {
    users: Vec<UserRef>,
    tasks: Vec<Task>,
    departments: Vec<Department>,
    reviews: Vec<ReviewRecord>,
    rejections: Vec<RejectionRecord>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn is_done(status: Status) -> bool {
    matches!(status, Status::Completed | Status::Feedbacked)
}

impl Store {
    pub fn new(users: Vec<UserRef>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    pub fn users(&self) -> &[UserRef] {
        &self.users
    }

    pub fn insert_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn insert_department(&mut self, department: Department) {
        self.departments.push(department);
    }

    pub fn reviews(&self) -> &[ReviewRecord] {
        &self.reviews
    }

    pub fn rejections(&self) -> &[RejectionRecord] {
        &self.rejections
    }

    fn user(&self, id: &str) -> Result<UserRef, ServiceError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::InvalidInput(format!("unknown user {id}")))
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, ServiceError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("task {id}")))
    }

    // -- Tasks --

    pub fn list_tasks(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("task {id}")))
    }

    pub fn create_task(&mut self, input: &CreateTask) -> Result<Task, ServiceError> {
        input.validate()?;
        let assignees = input
            .assignee_ids
            .iter()
            .map(|id| self.user(id))
            .collect::<Result<Vec<_>, _>>()?;
        let task = Task {
            id: new_id(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            start_date: input.start_date,
            due_date: input.due_date,
            status: Status::Todo,
            priority: input.priority,
            owner: assignees.first().cloned(),
            assignees,
            checklist: Vec::new(),
            contents: Vec::new(),
            file_count: 0,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_status(&mut self, id: &str, status: Status) -> Result<Task, ServiceError> {
        if status == Status::Unknown {
            return Err(ServiceError::InvalidInput("unrecognised status".into()));
        }
        let task = self.task_mut(id)?;
        task.status = status;
        Ok(task.clone())
    }

    pub fn review(&mut self, id: &str, input: &ReviewTask) -> Result<Task, ServiceError> {
        input.validate()?;
        let task = self.task_mut(id)?;
        if task.status == Status::Rejected {
            return Err(ServiceError::InvalidInput(
                "a rejected task cannot be reviewed".into(),
            ));
        }
        task.status = Status::Feedbacked;
        let task = task.clone();
        self.reviews.push(ReviewRecord {
            task_id: id.to_string(),
            task_owner_id: input.task_owner_id.clone(),
            quality_score: input.quality_score,
            notes: input.notes.clone(),
            reviewed_at: Utc::now(),
        });
        Ok(task)
    }

    pub fn reject(&mut self, id: &str, input: &RejectTask) -> Result<Task, ServiceError> {
        input.validate()?;
        let task = self.task_mut(id)?;
        task.status = Status::Rejected;
        let task = task.clone();
        self.rejections.push(RejectionRecord {
            task_id: id.to_string(),
            reason: input.reason.trim().to_string(),
            notes: input.notes.clone(),
            rejected_at: Utc::now(),
        });
        Ok(task)
    }

    // -- Checklist --

    pub fn add_checklist_item(
        &mut self,
        task_id: &str,
        input: &NewChecklistItem,
    ) -> Result<Task, ServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput(
                "title: checklist item title is required".into(),
            ));
        }
        let task = self.task_mut(task_id)?;
        task.checklist.push(ChecklistItem {
            id: new_id(),
            title: title.to_string(),
            is_completed: false,
            is_active: true,
        });
        Ok(task.clone())
    }

    fn checklist_item_mut<'a>(
        task: &'a mut Task,
        item_id: &str,
    ) -> Result<&'a mut ChecklistItem, ServiceError> {
        task.checklist
            .iter_mut()
            .find(|c| c.id == item_id && c.is_active)
            .ok_or_else(|| ServiceError::NotFound(format!("checklist item {item_id}")))
    }

    pub fn set_checklist_item_completed(
        &mut self,
        task_id: &str,
        item_id: &str,
        completed: bool,
    ) -> Result<Task, ServiceError> {
        let task = self.task_mut(task_id)?;
        Self::checklist_item_mut(task, item_id)?.is_completed = completed;
        Ok(task.clone())
    }

    pub fn deactivate_checklist_item(
        &mut self,
        task_id: &str,
        item_id: &str,
    ) -> Result<Task, ServiceError> {
        let task = self.task_mut(task_id)?;
        Self::checklist_item_mut(task, item_id)?.is_active = false;
        Ok(task.clone())
    }

    // -- Contents --

    pub fn add_content(&mut self, task_id: &str, input: &NewContent) -> Result<Task, ServiceError> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(ServiceError::InvalidInput(
                "content: comment must not be empty".into(),
            ));
        }
        let user = self.user(&input.user_id)?;
        let task = self.task_mut(task_id)?;
        task.contents.push(TaskContent {
            id: new_id(),
            user,
            content: content.to_string(),
            is_active: true,
            created_at: Utc::now(),
        });
        Ok(task.clone())
    }

    pub fn deactivate_content(
        &mut self,
        task_id: &str,
        content_id: &str,
    ) -> Result<Task, ServiceError> {
        let task = self.task_mut(task_id)?;
        let entry = task
            .contents
            .iter_mut()
            .find(|c| c.id == content_id && c.is_active)
            .ok_or_else(|| ServiceError::NotFound(format!("content {content_id}")))?;
        entry.is_active = false;
        Ok(task.clone())
    }

    // -- Files --

    pub fn record_upload(&mut self, task_id: &str, size: usize) -> Result<Task, ServiceError> {
        if size == 0 {
            return Err(ServiceError::InvalidInput("taskImage: file is empty".into()));
        }
        let task = self.task_mut(task_id)?;
        task.file_count += 1;
        Ok(task.clone())
    }

    // -- Departments --

    pub fn departments(&self, page: u32, limit: u32) -> Page<Department> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let start = ((page - 1) as usize).saturating_mul(limit as usize);
        let items = self
            .departments
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        Page {
            items,
            total: self.departments.len() as u64,
            page,
            limit,
        }
    }

    // -- Performance --

    fn average_score<'a>(records: impl Iterator<Item = &'a ReviewRecord>) -> f64 {
        let (sum, count) = records.fold((0u32, 0u32), |(s, c), r| {
            (s + u32::from(r.quality_score), c + 1)
        });
        if count == 0 {
            0.0
        } else {
            f64::from(sum) / f64::from(count)
        }
    }

    /// Share of finished tasks that were not past due at `now`.
    fn on_time_rate<'a>(tasks: impl Iterator<Item = &'a Task>, now: DateTime<Utc>) -> f64 {
        let (on_time, done) = tasks
            .filter(|t| is_done(t.status))
            .fold((0u32, 0u32), |(ok, n), t| {
                let late = t.due_date.is_some_and(|due| due < now);
                (ok + u32::from(!late), n + 1)
            });
        if done == 0 {
            0.0
        } else {
            f64::from(on_time) / f64::from(done)
        }
    }

    pub fn overview(&self, now: DateTime<Utc>) -> PerformanceOverview {
        PerformanceOverview {
            total_employees: self.users.len() as u32,
            total_projects: 1,
            total_tasks: self.tasks.len() as u32,
            completed_tasks: self.tasks.iter().filter(|t| is_done(t.status)).count() as u32,
            average_quality_score: Self::average_score(self.reviews.iter()),
            on_time_rate: Self::on_time_rate(self.tasks.iter(), now),
        }
    }

    /// Tasks are not grouped by project here, so this reports one aggregate row.
    pub fn project_stats(&self, now: DateTime<Utc>) -> Vec<ProjectStats> {
        let total = self.tasks.len() as u32;
        let completed = self.tasks.iter().filter(|t| is_done(t.status)).count() as u32;
        let overdue = self
            .tasks
            .iter()
            .filter(|t| {
                t.status == Status::Overdued
                    || (!is_done(t.status) && t.due_date.is_some_and(|due| due < now))
            })
            .count() as u32;
        vec![ProjectStats {
            project_id: "all".into(),
            project_name: "All tasks".into(),
            total_tasks: total,
            completed_tasks: completed,
            overdue_tasks: overdue,
            completion_rate: if total == 0 {
                0.0
            } else {
                f64::from(completed) / f64::from(total)
            },
        }]
    }

    pub fn kpi(&self, now: DateTime<Utc>) -> Vec<Kpi> {
        self.users
            .iter()
            .map(|user| {
                let mine: Vec<&Task> = self
                    .tasks
                    .iter()
                    .filter(|t| t.assignees.iter().any(|a| a.id == user.id))
                    .collect();
                Kpi {
                    user: user.clone(),
                    tasks_completed: mine.iter().filter(|t| is_done(t.status)).count() as u32,
                    average_quality_score: Self::average_score(
                        self.reviews.iter().filter(|r| r.task_owner_id == user.id),
                    ),
                    on_time_rate: Self::on_time_rate(mine.into_iter(), now),
                }
            })
            .collect()
    }

    pub fn ai_analysis(&self, now: DateTime<Utc>) -> AiAnalysis {
        let stats = self.project_stats(now);
        let row = &stats[0];
        let mut recommendations = Vec::new();
        if row.overdue_tasks > 0 {
            recommendations.push(format!(
                "{} task(s) are past due; rebalance assignments or extend deadlines.",
                row.overdue_tasks
            ));
        }
        let rejected = self
            .tasks
            .iter()
            .filter(|t| t.status == Status::Rejected)
            .count();
        if rejected > 0 {
            recommendations.push(format!(
                "{rejected} task(s) were rejected; review acceptance criteria with assignees."
            ));
        }
        if recommendations.is_empty() {
            recommendations.push("No risks detected.".into());
        }
        AiAnalysis {
            summary: format!(
                "{} of {} tasks completed ({:.0}%).",
                row.completed_tasks,
                row.total_tasks,
                row.completion_rate * 100.0
            ),
            recommendations,
            generated_at: Some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use workpulse_core::task::Priority;

    fn roster() -> Vec<UserRef> {
        vec![UserRef {
            id: "u1".into(),
            name: "Ann".into(),
            avatar: String::new(),
        }]
    }

    fn create(store: &mut Store, name: &str) -> Task {
        store
            .create_task(&CreateTask {
                name: name.into(),
                description: String::new(),
                start_date: None,
                due_date: None,
                priority: Priority::High,
                assignee_ids: vec!["u1".into()],
            })
            .unwrap()
    }

    #[test]
    fn create_task_resolves_assignees() {
        let mut store = Store::new(roster());
        let task = create(&mut store, "Payroll audit");
        assert_eq!(task.status, Status::Todo);
        assert_eq!(task.owner_id(), Some("u1"));

        let err = store
            .create_task(&CreateTask {
                name: "Other".into(),
                description: String::new(),
                start_date: None,
                due_date: None,
                priority: Priority::Low,
                assignee_ids: vec!["ghost".into()],
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[test]
    fn review_and_reject_set_status() {
        let mut store = Store::new(roster());
        let a = create(&mut store, "Task A");
        let b = create(&mut store, "Task B");

        let reviewed = store
            .review(
                &a.id,
                &ReviewTask {
                    task_id: a.id.clone(),
                    task_owner_id: "u1".into(),
                    quality_score: 8,
                    notes: String::new(),
                },
            )
            .unwrap();
        assert_eq!(reviewed.status, Status::Feedbacked);

        let rejected = store
            .reject(
                &b.id,
                &RejectTask {
                    task_id: b.id.clone(),
                    reason: "Incomplete".into(),
                    notes: String::new(),
                },
            )
            .unwrap();
        assert_eq!(rejected.status, Status::Rejected);
        assert_eq!(store.rejections().len(), 1);

        let err = store
            .review(
                &b.id,
                &ReviewTask {
                    task_id: b.id.clone(),
                    task_owner_id: "u1".into(),
                    quality_score: 5,
                    notes: String::new(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(store.overview(Utc::now()).average_quality_score, 8.0);
    }

    #[test]
    fn checklist_and_contents_are_soft_deleted() {
        let mut store = Store::new(roster());
        let task = create(&mut store, "Onboarding");
        let task = store
            .add_checklist_item(&task.id, &NewChecklistItem { title: "Laptop".into() })
            .unwrap();
        let item_id = task.checklist[0].id.clone();
        let task = store.deactivate_checklist_item(&task.id, &item_id).unwrap();
        assert_eq!(task.checklist.len(), 1);
        assert!(!task.checklist[0].is_active);
        assert!(store
            .set_checklist_item_completed(&task.id, &item_id, true)
            .is_err());

        let task = store
            .add_content(
                &task.id,
                &NewContent {
                    user_id: "u1".into(),
                    content: "Ordered".into(),
                },
            )
            .unwrap();
        let content_id = task.contents[0].id.clone();
        let task = store.deactivate_content(&task.id, &content_id).unwrap();
        assert_eq!(task.contents.len(), 1);
        assert_eq!(task.active_contents().count(), 0);
    }

    #[test]
    fn departments_paginate() {
        let mut store = Store::new(roster());
        for i in 0..5 {
            store.insert_department(Department {
                id: format!("d{i}"),
                name: format!("Dept {i}"),
                description: String::new(),
                manager: None,
                employee_count: 0,
            });
        }
        let page = store.departments(2, 2);
        assert_eq!(page.total, 5);
        assert_eq!(
            page.items.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
            vec!["d2", "d3"]
        );
        assert!(store.departments(4, 2).items.is_empty());
    }

    #[test]
    fn overdue_counts_unfinished_past_due() {
        let mut store = Store::new(roster());
        let now = Utc::now();
        let mut late = create(&mut store, "Late one");
        late.due_date = Some(now - Duration::days(1));
        store.tasks[0] = late;
        create(&mut store, "On time");

        let stats = store.project_stats(now);
        assert_eq!(stats[0].total_tasks, 2);
        assert_eq!(stats[0].overdue_tasks, 1);
    }
}
