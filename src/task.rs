//! Task and time-entry data structures.
//!
//! This module defines the core `Task` record with its workflow metadata and
//! time-tracking ledger, plus the input shapes the store accepts for create
//! and update operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::{Priority, Status, TaskType};

/// A tracked unit of work (bug, task, feature, or improvement).
///
/// `total_time_spent` is derived: it always equals the sum of
/// `time_entries[].hours` and is recomputed by the store on every append.
/// `closed_at_utc` and `approved_by` are stamped only when the task moves to
/// `Closed`, in the same write as the status itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub kind: TaskType,
    pub priority: Priority,
    pub status: Status,
    pub assignee_id: u64,
    pub assignee_name: String,
    pub reporter_id: u64,
    pub reporter_name: String,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
    pub due: Option<NaiveDate>,
    pub closed_at_utc: Option<i64>,
    pub approved_by: Option<u64>,
    #[serde(default)]
    pub time_entries: Vec<TimeEntry>,
    #[serde(default)]
    pub total_time_spent: f64,
}

impl Task {
    /// A task is overdue once its due date has passed and it is still open
    /// in any form.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due {
            Some(due) => due < today && self.status != Status::Closed,
            None => false,
        }
    }
}

/// A logged record of hours spent on a task on a given calendar day.
///
/// Entries are append-only: never edited or removed once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub task_id: u64,
    pub user_id: u64,
    pub description: String,
    pub hours: f64,
    pub date: NaiveDate,
    pub created_at_utc: i64,
}

/// Caller-supplied fields for task creation. The store assigns the id,
/// timestamps, and the empty time ledger.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub kind: TaskType,
    pub priority: Priority,
    pub status: Status,
    pub assignee_id: u64,
    pub assignee_name: String,
    pub reporter_id: u64,
    pub reporter_name: String,
    pub due: Option<NaiveDate>,
}

/// Partial update for a task's free-form fields.
///
/// Status is deliberately absent: status changes go through the workflow
/// gate, never through a field merge.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub kind: Option<TaskType>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<u64>,
    pub assignee_name: Option<String>,
    pub due: Option<NaiveDate>,
    pub clear_due: bool,
}

impl TaskPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.kind.is_none()
            && self.priority.is_none()
            && self.assignee_id.is_none()
            && self.assignee_name.is_none()
            && self.due.is_none()
            && !self.clear_due
    }
}

/// Caller-supplied fields for logging time against a task.
#[derive(Debug, Clone)]
pub struct NewTimeEntry {
    pub task_id: u64,
    pub user_id: u64,
    pub description: String,
    pub hours: f64,
    pub date: NaiveDate,
}
