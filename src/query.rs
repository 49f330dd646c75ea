//! Derived views over a task snapshot.
//!
//! Everything here is a pure function of the slice it is handed: filters,
//! the daily activity trend, the assignee roster, and the dashboard stats.
//! Nothing mutates its input and nothing is cached; views are recomputed
//! from the current snapshot on every call.

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};

use crate::fields::{Priority, Status, TaskType};
use crate::task::Task;

/// Filter criteria. `None` means "don't filter on this field"; all set
/// criteria must match (conjunctive).
#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    pub search: String,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub kind: Option<TaskType>,
    pub assignee: Option<u64>,
}

impl TaskFilters {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.status.is_none()
            && self.priority.is_none()
            && self.kind.is_none()
            && self.assignee.is_none()
    }
}

/// Apply filters to a snapshot: case-insensitive substring search over
/// title, description and assignee name, then exact matches on status,
/// priority, type and assignee.
pub fn filter(tasks: &[Task], criteria: &TaskFilters) -> Vec<Task> {
    let needle = criteria.search.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            if !needle.is_empty()
                && !t.title.to_lowercase().contains(&needle)
                && !t.description.to_lowercase().contains(&needle)
                && !t.assignee_name.to_lowercase().contains(&needle)
            {
                return false;
            }
            if let Some(status) = criteria.status {
                if t.status != status {
                    return false;
                }
            }
            if let Some(priority) = criteria.priority {
                if t.priority != priority {
                    return false;
                }
            }
            if let Some(kind) = criteria.kind {
                if t.kind != kind {
                    return false;
                }
            }
            if let Some(assignee) = criteria.assignee {
                if t.assignee_id != assignee {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// One day of logged activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Activity over the last `window_days` local calendar days, today included.
pub fn daily_trend(tasks: &[Task], window_days: u32) -> Vec<TrendPoint> {
    daily_trend_from(tasks, Local::now().date_naive(), window_days)
}

/// Trend anchored on an explicit `today`, oldest bucket first. Each time
/// entry dated inside the window counts one event against its day; hours
/// and task identity are irrelevant here. Days without entries stay zero.
pub fn daily_trend_from(tasks: &[Task], today: NaiveDate, window_days: u32) -> Vec<TrendPoint> {
    let mut buckets: Vec<TrendPoint> = (0..window_days)
        .rev()
        .map(|ago| TrendPoint { date: today - Duration::days(i64::from(ago)), count: 0 })
        .collect();

    for task in tasks {
        for entry in &task.time_entries {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.date == entry.date) {
                bucket.count += 1;
            }
        }
    }
    buckets
}

/// A distinct assignee seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeRef {
    pub id: u64,
    pub name: String,
}

/// One entry per distinct assignee id; the last-seen name wins when ids
/// repeat with different names. Ordering is unspecified.
pub fn unique_assignees(tasks: &[Task]) -> Vec<AssigneeRef> {
    let mut seen: HashMap<u64, String> = HashMap::new();
    for t in tasks {
        seen.insert(t.assignee_id, t.assignee_name.clone());
    }
    seen.into_iter()
        .map(|(id, name)| AssigneeRef { id, name })
        .collect()
}

/// Headline numbers for a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStats {
    /// Open or in-progress.
    pub active: usize,
    pub closed: usize,
    pub pending_approval: usize,
    /// Critical priority and not yet closed.
    pub critical: usize,
    pub total_hours: f64,
    /// Distinct assignees.
    pub team_size: usize,
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    TaskStats {
        active: tasks
            .iter()
            .filter(|t| matches!(t.status, Status::Open | Status::InProgress))
            .count(),
        closed: tasks.iter().filter(|t| t.status == Status::Closed).count(),
        pending_approval: tasks
            .iter()
            .filter(|t| t.status == Status::PendingApproval)
            .count(),
        critical: tasks
            .iter()
            .filter(|t| t.priority == Priority::Critical && t.status != Status::Closed)
            .count(),
        total_hours: tasks.iter().map(|t| t.total_time_spent).sum(),
        team_size: unique_assignees(tasks).len(),
    }
}
