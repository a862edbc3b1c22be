use chrono::{DateTime, Duration, Utc};
use workpulse_core::org::Department;
use workpulse_core::task::{ChecklistItem, Priority, Status, Task, TaskContent, UserRef};

use crate::store::Store;

pub fn roster() -> Vec<UserRef> {
    [
        ("u-ann", "Ann Lee"),
        ("u-bo", "Bo Tran"),
        ("u-cai", "Cai Nguyen"),
        ("u-dee", "Dee Pham"),
    ]
    .into_iter()
    .map(|(id, name)| UserRef {
        id: id.into(),
        name: name.into(),
        avatar: format!("https://avatars.example.com/{id}.png"),
    })
    .collect()
}

fn demo_task(
    id: &str,
    name: &str,
    status: Status,
    priority: Priority,
    due_in_days: i64,
    assignee: &UserRef,
    now: DateTime<Utc>,
) -> Task {
    Task {
        id: id.into(),
        name: name.into(),
        description: String::new(),
        start_date: Some(now - Duration::days(7)),
        due_date: Some(now + Duration::days(due_in_days)),
        status,
        priority,
        owner: Some(assignee.clone()),
        assignees: vec![assignee.clone()],
        checklist: Vec::new(),
        contents: Vec::new(),
        file_count: 0,
    }
}

/// A store populated with a handful of tasks in every status plus a few
/// departments, for local development.
pub fn demo_store(now: DateTime<Utc>) -> Store {
    let users = roster();
    let mut store = Store::new(users.clone());

    let mut onboarding = demo_task(
        "task-onboarding",
        "Onboard new analysts",
        Status::Doing,
        Priority::High,
        3,
        &users[0],
        now,
    );
    onboarding.checklist = vec![
        ChecklistItem {
            id: "cl-1".into(),
            title: "Accounts created".into(),
            is_completed: true,
            is_active: true,
        },
        ChecklistItem {
            id: "cl-2".into(),
            title: "Laptops issued".into(),
            is_completed: false,
            is_active: true,
        },
    ];
    onboarding.contents = vec![TaskContent {
        id: "ct-1".into(),
        user: users[1].clone(),
        content: "Two laptops still on backorder.".into(),
        is_active: true,
        created_at: now - Duration::hours(5),
    }];

    let tasks = vec![
        demo_task(
            "task-handbook",
            "Update employee handbook",
            Status::Todo,
            Priority::Medium,
            10,
            &users[1],
            now,
        ),
        demo_task(
            "task-survey",
            "Run engagement survey",
            Status::Overdued,
            Priority::High,
            -2,
            &users[2],
            now,
        ),
        onboarding,
        demo_task(
            "task-payroll",
            "Reconcile payroll export",
            Status::Reviewing,
            Priority::Medium,
            1,
            &users[3],
            now,
        ),
        demo_task(
            "task-benefits",
            "Benefits enrolment follow-up",
            Status::Completed,
            Priority::Low,
            -1,
            &users[0],
            now,
        ),
        demo_task(
            "task-kpi",
            "Draft Q3 KPI targets",
            Status::Feedbacked,
            Priority::Medium,
            5,
            &users[2],
            now,
        ),
        demo_task(
            "task-offsite",
            "Book team offsite venue",
            Status::Rejected,
            Priority::Low,
            20,
            &users[1],
            now,
        ),
    ];
    for task in tasks {
        store.insert_task(task);
    }

    for (i, (name, manager)) in [
        ("People Operations", &users[0]),
        ("Finance", &users[3]),
        ("Engineering", &users[2]),
    ]
    .into_iter()
    .enumerate()
    {
        store.insert_department(Department {
            id: format!("dept-{}", i + 1),
            name: name.into(),
            description: String::new(),
            manager: Some(manager.clone()),
            employee_count: 4 + i as u32 * 3,
        });
    }

    store
}
