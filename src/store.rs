//! The task store: authoritative owner of the task collection.
//!
//! `TaskStore` is a flat in-memory collection with synchronous CRUD and
//! time-logging operations. Derived fields (`total_time_spent`,
//! `updated_at_utc`) are recomputed here on every mutation so callers can
//! never desynchronise them. The store does not validate status values;
//! transitions are checked by the `workflow` module before they reach it.
//!
//! `Board` is the JSON snapshot the CLI persists between invocations: the
//! store plus the logged-in user slot. The engine itself never touches disk.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::{Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::demo_users;
use crate::error::{Error, Result};
use crate::fields::{Priority, Status, TaskType};
use crate::task::{NewTask, NewTimeEntry, Task, TaskPatch, TimeEntry};

/// Upper bound on a single time entry. A calendar day holds no more.
pub const MAX_ENTRY_HOURS: f64 = 24.0;

/// In-memory store for tasks and their time entries.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        TaskStore { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in insertion order, as independent copies. Mutating the
    /// returned vector never affects the store.
    pub fn list(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    /// Tasks assigned to the given user, insertion order.
    pub fn list_by_assignee(&self, user_id: u64) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.assignee_id == user_id)
            .cloned()
            .collect()
    }

    /// Get a task by id.
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Next available task id.
    fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Next available time-entry id, unique across all tasks.
    fn next_entry_id(&self) -> u64 {
        self.tasks
            .iter()
            .flat_map(|t| t.time_entries.iter())
            .map(|e| e.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Create a task. The store assigns the id and timestamps; a fresh
    /// task starts with an empty time ledger. Never fails.
    pub fn create(&mut self, new: NewTask) -> Task {
        let now = Utc::now().timestamp();
        let task = Task {
            id: self.next_task_id(),
            title: new.title,
            description: new.description,
            kind: new.kind,
            priority: new.priority,
            status: new.status,
            assignee_id: new.assignee_id,
            assignee_name: new.assignee_name,
            reporter_id: new.reporter_id,
            reporter_name: new.reporter_name,
            created_at_utc: now,
            updated_at_utc: now,
            due: new.due,
            closed_at_utc: None,
            approved_by: None,
            time_entries: Vec::new(),
            total_time_spent: 0.0,
        };
        debug!(id = task.id, title = %task.title, "created task");
        self.tasks.push(task.clone());
        task
    }

    /// Merge a partial update onto an existing task and refresh its
    /// `updated_at_utc`. Returns `None` when the id is unknown.
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Option<Task> {
        let task = self.get_mut(id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(kind) = patch.kind {
            task.kind = kind;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = patch.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(assignee_name) = patch.assignee_name {
            task.assignee_name = assignee_name;
        }
        if patch.clear_due {
            task.due = None;
        } else if let Some(due) = patch.due {
            task.due = Some(due);
        }
        task.updated_at_utc = Utc::now().timestamp();
        debug!(id, "updated task");
        Some(task.clone())
    }

    /// Remove a task. Returns whether a record was actually removed.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() < before;
        if removed {
            debug!(id, "deleted task");
        }
        removed
    }

    /// Append a time entry to its task, recompute the task's total, and
    /// refresh its `updated_at_utc`. Hours must lie in `(0, 24]`; the
    /// referenced task must exist. A failed call leaves the store unchanged.
    pub fn add_time_entry(&mut self, entry: NewTimeEntry) -> Result<TimeEntry> {
        if !(entry.hours > 0.0 && entry.hours <= MAX_ENTRY_HOURS) {
            return Err(Error::Validation(format!(
                "hours must be greater than 0 and at most {MAX_ENTRY_HOURS}, got {}",
                entry.hours
            )));
        }
        let id = self.next_entry_id();
        let now = Utc::now().timestamp();
        let task = match self.get_mut(entry.task_id) {
            Some(task) => task,
            None => return Err(Error::TaskNotFound(entry.task_id)),
        };
        let record = TimeEntry {
            id,
            task_id: entry.task_id,
            user_id: entry.user_id,
            description: entry.description,
            hours: entry.hours,
            date: entry.date,
            created_at_utc: now,
        };
        task.time_entries.push(record.clone());
        task.total_time_spent = task.time_entries.iter().map(|e| e.hours).sum();
        task.updated_at_utc = now;
        debug!(task = task.id, hours = record.hours, "logged time");
        Ok(record)
    }

    /// Write a status without validating the transition; legality and
    /// permission checks belong to the workflow gate. When the new status is
    /// `Closed`, the close stamp and approver are written in the same call,
    /// so no half-closed task is ever observable. Returns `None` when the id
    /// is unknown.
    pub fn set_status(&mut self, id: u64, to: Status, approver: Option<u64>) -> Option<Task> {
        let now = Utc::now().timestamp();
        let task = self.get_mut(id)?;
        let from = task.status;
        task.status = to;
        if to == Status::Closed {
            task.closed_at_utc = Some(now);
            task.approved_by = approver;
        }
        task.updated_at_utc = now;
        debug!(id, ?from, ?to, "status changed");
        Some(task.clone())
    }

    /// Resolve a task identifier (numeric id or exact title, case-insensitive)
    /// to a task id. Ambiguous titles are rejected with a hint to use the id.
    pub fn resolve_task(&self, identifier: &str) -> Result<u64> {
        if let Ok(id) = identifier.parse::<u64>() {
            return match self.get(id) {
                Some(_) => Ok(id),
                None => Err(Error::TaskNotFound(id)),
            };
        }

        let needle = identifier.to_lowercase();
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.title.to_lowercase() == needle)
            .collect();
        match matches.len() {
            0 => Err(Error::Validation(format!("no task titled '{identifier}'"))),
            1 => Ok(matches[0].id),
            n => Err(Error::Validation(format!(
                "{n} tasks titled '{identifier}'; use the numeric id"
            ))),
        }
    }
}

/// The persisted document behind the CLI: the store plus the logged-in user
/// slot. Storage is an explicit extension for the front-end; the engine is
/// memory-only.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Board {
    pub store: TaskStore,
    #[serde(default)]
    pub current_user: Option<u64>,
}

impl Board {
    /// Load a board from a JSON file, starting fresh if it doesn't exist.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Board::default();
        }
        let mut buf = String::new();
        match File::open(path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(board) => board,
                Err(e) => {
                    eprintln!("Error parsing board file, starting fresh: {e}");
                    Board::default()
                }
            },
            Err(e) => {
                eprintln!("Error reading board file, starting fresh: {e}");
                Board::default()
            }
        }
    }

    /// Save the board using an atomic write (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp)?;
        let data = serde_json::to_string_pretty(self)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

/// Demo fixture tasks for the two built-in accounts. Time entries are dated
/// relative to today so the trend view has something to show.
pub fn demo_tasks() -> Vec<Task> {
    let users = demo_users();
    let dev = users[0].clone();
    let mgr = users[1].clone();
    let now = Utc::now().timestamp();
    let today = Local::now().date_naive();
    let day = |ago: i64| today - Duration::days(ago);
    let hour = 3600;

    let entry = |id, task_id, hours, ago: i64, desc: &str| TimeEntry {
        id,
        task_id,
        user_id: dev.id,
        description: desc.to_string(),
        hours,
        date: day(ago),
        created_at_utc: now - ago * 24 * hour,
    };

    vec![
        Task {
            id: 1,
            title: "Password reset email never arrives".into(),
            description: "Reset requests are accepted but the mail is silently dropped \
                          somewhere between the queue and the provider."
                .into(),
            kind: TaskType::Bug,
            priority: Priority::High,
            status: Status::InProgress,
            assignee_id: dev.id,
            assignee_name: dev.name.clone(),
            reporter_id: mgr.id,
            reporter_name: mgr.name.clone(),
            created_at_utc: now - 48 * hour,
            updated_at_utc: now - 20 * hour,
            due: Some(day(-2)),
            closed_at_utc: None,
            approved_by: None,
            time_entries: vec![entry(1, 1, 2.5, 1, "Traced the failure to the SMTP retry queue")],
            total_time_spent: 2.5,
        },
        Task {
            id: 2,
            title: "Keyboard shortcuts for the issue list".into(),
            description: "Add j/k navigation and single-key actions so the list is usable \
                          without a mouse."
                .into(),
            kind: TaskType::Feature,
            priority: Priority::Medium,
            status: Status::PendingApproval,
            assignee_id: dev.id,
            assignee_name: dev.name.clone(),
            reporter_id: dev.id,
            reporter_name: dev.name.clone(),
            created_at_utc: now - 72 * hour,
            updated_at_utc: now - 18 * hour,
            due: Some(day(-3)),
            closed_at_utc: None,
            approved_by: None,
            time_entries: vec![
                entry(2, 2, 4.0, 2, "Key dispatch layer and shortcut registry"),
                entry(3, 2, 1.5, 1, "Help overlay listing the bindings"),
            ],
            total_time_spent: 5.5,
        },
        Task {
            id: 3,
            title: "Search index drops results after reindex".into(),
            description: "A full reindex intermittently loses documents created while the \
                          rebuild is running."
                .into(),
            kind: TaskType::Bug,
            priority: Priority::Critical,
            status: Status::Open,
            assignee_id: dev.id,
            assignee_name: dev.name.clone(),
            reporter_id: mgr.id,
            reporter_name: mgr.name.clone(),
            created_at_utc: now - 30 * hour,
            updated_at_utc: now - 30 * hour,
            due: Some(day(-1)),
            closed_at_utc: None,
            approved_by: None,
            time_entries: Vec::new(),
            total_time_spent: 0.0,
        },
        Task {
            id: 4,
            title: "Paginate the activity feed".into(),
            description: "The feed renders every event at once; page it to keep large \
                          boards responsive."
                .into(),
            kind: TaskType::Improvement,
            priority: Priority::Medium,
            status: Status::Open,
            assignee_id: dev.id,
            assignee_name: dev.name.clone(),
            reporter_id: mgr.id,
            reporter_name: mgr.name.clone(),
            created_at_utc: now - 26 * hour,
            updated_at_utc: now - 26 * hour,
            due: Some(day(-4)),
            closed_at_utc: None,
            approved_by: None,
            time_entries: Vec::new(),
            total_time_spent: 0.0,
        },
        Task {
            id: 5,
            title: "Export issues as CSV".into(),
            description: "One-click export of the current view for offline reporting.".into(),
            kind: TaskType::Feature,
            priority: Priority::Low,
            status: Status::Closed,
            assignee_id: dev.id,
            assignee_name: dev.name.clone(),
            reporter_id: mgr.id,
            reporter_name: mgr.name.clone(),
            created_at_utc: now - 96 * hour,
            updated_at_utc: now - 24 * hour,
            due: None,
            closed_at_utc: Some(now - 24 * hour),
            approved_by: Some(mgr.id),
            time_entries: vec![
                entry(4, 5, 1.0, 3, "Compared csv crates and picked the column layout"),
                entry(5, 5, 3.0, 2, "Writer plus header row handling"),
            ],
            total_time_spent: 4.0,
        },
    ]
}
