//! Aggregate metrics returned by the performance endpoints.
//!
//! Every field defaults so that a partially populated payload still decodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::UserRef;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectStats {
    pub project_id: String,
    pub project_name: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub overdue_tasks: u32,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceOverview {
    pub total_employees: u32,
    pub total_projects: u32,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub average_quality_score: f64,
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub user: UserRef,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub average_quality_score: f64,
    #[serde(default)]
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiAnalysis {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub generated_at: Option<DateTime<Utc>>,
}
