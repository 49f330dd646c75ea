//! Command implementations for the CLI interface.
//!
//! These handlers are the "UI" of the demo: they resolve the acting user,
//! ask the workflow gate what is allowed, call into the store, and render
//! the result. Errors go to stderr and exit with status 1; the engine is
//! never left half-mutated because every engine call is atomic.

use std::path::Path;

use chrono::{Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::auth::{demo_users, Session, User};
use crate::error::Error;
use crate::fields::*;
use crate::query::{self, TaskFilters};
use crate::store::{demo_tasks, Board, TaskStore};
use crate::task::{NewTask, NewTimeEntry, Task, TaskPatch};
use crate::workflow;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in as one of the demo users.
    Login {
        /// Account email.
        email: String,
        /// Account password.
        #[arg(long)]
        password: String,
    },

    /// Log out of the current session.
    Logout,

    /// Show who is logged in.
    Whoami,

    /// Add a new task. You become the reporter.
    Add {
        /// Short title for the task.
        title: String,
        /// Longer description.
        #[arg(long)]
        desc: String,
        /// Task type: bug | task | feature | improvement.
        #[arg(long, value_enum, default_value_t = TaskType::Task)]
        kind: TaskType,
        /// Priority: low | medium | high | critical.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// Assignee user id or email. Defaults to you.
        #[arg(long)]
        assignee: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in Nd", or a weekday.
        #[arg(long)]
        due: Option<String>,
    },

    /// List your visible tasks. Managers see every task, developers their own.
    List {
        /// Substring search over title, description and assignee name.
        #[arg(long)]
        search: Option<String>,
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by task type.
        #[arg(long, value_enum)]
        kind: Option<TaskType>,
        /// Filter by assignee id or email.
        #[arg(long)]
        assignee: Option<String>,
    },

    /// View a single task by id or title, including its time entries.
    View {
        /// Task id or title.
        id: String,
    },

    /// Update fields on a task (assignee or manager).
    Update {
        /// Task id or title.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        kind: Option<TaskType>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// New assignee user id or email.
        #[arg(long)]
        assignee: Option<String>,
        /// New due date.
        #[arg(long)]
        due: Option<String>,
        /// Clear the due date.
        #[arg(long)]
        clear_due: bool,
    },

    /// Delete a task (reporter or manager; closed tasks are kept).
    Delete {
        /// Task id or title.
        id: String,
    },

    /// Start work on a task (open or reopened -> in progress).
    Start {
        /// Task id or title.
        id: String,
    },

    /// Submit a task for approval (in progress -> pending approval).
    Complete {
        /// Task id or title.
        id: String,
    },

    /// Approve and close a task (manager only).
    Approve {
        /// Task id or title.
        id: String,
    },

    /// Send a task back for more work (manager only).
    Reopen {
        /// Task id or title.
        id: String,
    },

    /// Log hours you spent on a task.
    Log {
        /// Task id or title.
        id: String,
        /// Hours spent, up to 24 per entry.
        hours: f64,
        /// What the time went into.
        #[arg(long)]
        desc: String,
        /// Day the work happened. Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show logged activity per day over a recent window.
    Trend {
        /// Window size in days.
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Show headline numbers for your visible tasks.
    Stats,

    /// List the distinct assignees across your visible tasks.
    Assignees,

    /// Reset the board to the demo data set.
    Seed,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn fail(err: &Error) -> ! {
    eprintln!("{err}");
    std::process::exit(1);
}

fn save_or_exit(board: &Board, db_path: &Path) {
    if let Err(e) = board.save(db_path) {
        eprintln!("Failed to save board: {e}");
        std::process::exit(1);
    }
}

/// The acting user for this invocation, or exit if nobody is logged in.
fn require_user(board: &Board) -> User {
    let session = Session::resume(demo_users(), board.current_user);
    match session.current_user() {
        Some(user) => user.clone(),
        None => {
            eprintln!("Not logged in. Run `bt login <email> --password <password>` first.");
            std::process::exit(1);
        }
    }
}

fn resolve_task_or_exit(store: &TaskStore, identifier: &str) -> u64 {
    match store.resolve_task(identifier) {
        Ok(id) => id,
        Err(e) => fail(&e),
    }
}

fn resolve_user_or_exit(identifier: &str) -> User {
    let session = Session::new(demo_users());
    match session.resolve_user(identifier) {
        Some(user) => user.clone(),
        None => {
            eprintln!("Unknown user: {identifier}");
            std::process::exit(1);
        }
    }
}

fn parse_due_or_exit(raw: &str) -> NaiveDate {
    match parse_due_input(raw) {
        Some(date) => date,
        None => {
            eprintln!("Unrecognised date: {raw}");
            std::process::exit(1);
        }
    }
}

/// Developers see only their own tasks; managers see the whole board.
fn visible_tasks(board: &Board, user: &User) -> Vec<Task> {
    if user.is_manager() {
        board.store.list()
    } else {
        board.store.list_by_assignee(user.id)
    }
}

/// Parse human-friendly date input.
///
/// Supports "today", "tomorrow", "yesterday", "in Nd" / "in Nw", weekday
/// names (next occurrence, today counts), and YYYY-MM-DD.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(n) = rest.strip_suffix('d') {
            if let Ok(days) = n.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(n) = rest.strip_suffix('w') {
            if let Ok(weeks) = n.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    let weekdays = [
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
    ];
    for (target, name) in weekdays.iter().enumerate() {
        if s == *name || s == name[..3] {
            let current = today.weekday().num_days_from_monday() as i64;
            let ahead = (target as i64 + 7 - current) % 7;
            return Some(today + Duration::days(ahead));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let days = (d - today).num_days();
            match days {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

fn format_timestamp(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".into())
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[Task]) {
    println!(
        "{:<5} {:<12} {:<17} {:<9} {:<10} {:>6}  {:<16} {}",
        "ID", "Type", "Status", "Pri", "Due", "Hours", "Assignee", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        println!(
            "{:<5} {:<12} {:<17} {:<9} {:<10} {:>6.1}  {:<16} {}",
            t.id,
            format_type(t.kind),
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due, today),
            t.total_time_spent,
            truncate(&t.assignee_name, 16),
            t.title,
        );
    }
}

/// Log in and persist the session slot on the board.
pub fn cmd_login(board: &mut Board, db_path: &Path, email: &str, password: &str) {
    let mut session = Session::new(demo_users());
    match session.login(email, password) {
        Some(user) => {
            board.current_user = session.current_id();
            save_or_exit(board, db_path);
            info!(user = user.id, "login");
            println!("Logged in as {} ({})", user.name, format_role(user.role));
        }
        None => {
            eprintln!("Login failed.");
            std::process::exit(1);
        }
    }
}

pub fn cmd_logout(board: &mut Board, db_path: &Path) {
    board.current_user = None;
    save_or_exit(board, db_path);
    println!("Logged out.");
}

pub fn cmd_whoami(board: &Board) {
    let session = Session::resume(demo_users(), board.current_user);
    match session.current_user() {
        Some(user) => println!("{} <{}> ({})", user.name, user.email, format_role(user.role)),
        None => println!("Not logged in."),
    }
}

/// Add a new task reported by the current user.
pub fn cmd_add(
    board: &mut Board,
    db_path: &Path,
    title: String,
    desc: String,
    kind: TaskType,
    priority: Priority,
    assignee: Option<String>,
    due: Option<String>,
) {
    let user = require_user(board);

    let title = title.trim().to_string();
    let description = desc.trim().to_string();
    if title.is_empty() {
        eprintln!("Title must not be empty.");
        std::process::exit(1);
    }
    if description.is_empty() {
        eprintln!("Description must not be empty.");
        std::process::exit(1);
    }

    let assignee = match assignee.as_deref() {
        Some(ident) => resolve_user_or_exit(ident),
        None => user.clone(),
    };
    let due = due.as_deref().map(parse_due_or_exit);

    let task = board.store.create(NewTask {
        title,
        description,
        kind,
        priority,
        status: Status::Open,
        assignee_id: assignee.id,
        assignee_name: assignee.name,
        reporter_id: user.id,
        reporter_name: user.name,
        due,
    });
    save_or_exit(board, db_path);
    println!("Added task {}", task.id);
}

/// List the caller's visible tasks through the filter pipeline.
pub fn cmd_list(
    board: &Board,
    search: Option<String>,
    status: Option<Status>,
    priority: Option<Priority>,
    kind: Option<TaskType>,
    assignee: Option<String>,
) {
    let user = require_user(board);
    let criteria = TaskFilters {
        search: search.unwrap_or_default(),
        status,
        priority,
        kind,
        assignee: assignee.as_deref().map(|ident| resolve_user_or_exit(ident).id),
    };

    let visible = visible_tasks(board, &user);
    let tasks = query::filter(&visible, &criteria);
    print_table(&tasks);
    if tasks.is_empty() && !criteria.is_empty() {
        println!("No tasks match the filters.");
    }
}

/// View one task in detail.
pub fn cmd_view(board: &Board, identifier: &str) {
    let user = require_user(board);
    let id = resolve_task_or_exit(&board.store, identifier);
    let Some(task) = board.store.get(id) else {
        fail(&Error::TaskNotFound(id));
    };
    if !user.is_manager() && task.assignee_id != user.id {
        eprintln!("Task {id} is not assigned to you.");
        std::process::exit(1);
    }

    let session = Session::new(demo_users());
    let name_of = |uid: u64| {
        session
            .user_by_id(uid)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| format!("user {uid}"))
    };
    let today = Local::now().date_naive();

    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Type:         {}", format_type(task.kind));
    println!("Status:       {}", format_status(task.status));
    println!("Priority:     {}", format_priority(task.priority));
    println!("Assignee:     {}", task.assignee_name);
    println!("Reporter:     {}", task.reporter_name);
    println!(
        "Due:          {}",
        match task.due {
            Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
            None => "-".into(),
        }
    );
    println!("Created UTC:  {}", format_timestamp(task.created_at_utc));
    println!("Updated UTC:  {}", format_timestamp(task.updated_at_utc));
    if let Some(closed) = task.closed_at_utc {
        println!("Closed UTC:   {}", format_timestamp(closed));
    }
    if let Some(approver) = task.approved_by {
        println!("Approved by:  {}", name_of(approver));
    }
    println!("Description:\n{}\n", task.description);

    if task.time_entries.is_empty() {
        println!("Time entries: -");
    } else {
        println!("Time entries ({:.1}h total):", task.total_time_spent);
        for entry in &task.time_entries {
            println!(
                "  {}  {:>5.1}h  {}  ({})",
                entry.date,
                entry.hours,
                entry.description,
                name_of(entry.user_id)
            );
        }
    }

    let actions = workflow::available_transitions(task, &user);
    if !actions.is_empty() {
        let list = actions
            .iter()
            .map(|s| format_status(*s))
            .collect::<Vec<_>>()
            .join(", ");
        println!("\nYou can move this task to: {list}");
    }
}

/// Update free-form fields on a task.
pub fn cmd_update(
    board: &mut Board,
    db_path: &Path,
    identifier: &str,
    title: Option<String>,
    desc: Option<String>,
    kind: Option<TaskType>,
    priority: Option<Priority>,
    assignee: Option<String>,
    due: Option<String>,
    clear_due: bool,
) {
    let user = require_user(board);
    let id = resolve_task_or_exit(&board.store, identifier);
    let Some(task) = board.store.get(id) else {
        fail(&Error::TaskNotFound(id));
    };
    if !workflow::can_edit(task, &user) {
        fail(&Error::Forbidden(format!(
            "only the assignee or a manager may edit task {id}"
        )));
    }

    let new_assignee = assignee.as_deref().map(resolve_user_or_exit);
    let patch = TaskPatch {
        title,
        description: desc,
        kind,
        priority,
        assignee_id: new_assignee.as_ref().map(|u| u.id),
        assignee_name: new_assignee.map(|u| u.name),
        due: due.as_deref().map(parse_due_or_exit),
        clear_due,
    };
    if patch.is_empty() {
        println!("Nothing to update.");
        return;
    }

    match board.store.update(id, patch) {
        Some(_) => {
            save_or_exit(board, db_path);
            println!("Updated task {id}");
        }
        None => fail(&Error::TaskNotFound(id)),
    }
}

/// Delete a task, respecting the deletion policy.
pub fn cmd_delete(board: &mut Board, db_path: &Path, identifier: &str) {
    let user = require_user(board);
    let id = resolve_task_or_exit(&board.store, identifier);
    let Some(task) = board.store.get(id) else {
        fail(&Error::TaskNotFound(id));
    };
    if !workflow::can_delete(task, &user) {
        if task.status == Status::Closed {
            fail(&Error::Forbidden(
                "closed tasks are kept as history and cannot be deleted".to_string(),
            ));
        }
        fail(&Error::Forbidden(format!(
            "only the reporter or a manager may delete task {id}"
        )));
    }

    if board.store.delete(id) {
        save_or_exit(board, db_path);
        println!("Deleted task {id}");
    } else {
        fail(&Error::TaskNotFound(id));
    }
}

/// Request a status transition through the workflow gate.
pub fn cmd_transition(board: &mut Board, db_path: &Path, identifier: &str, to: Status) {
    let user = require_user(board);
    let id = resolve_task_or_exit(&board.store, identifier);
    match workflow::transition(&mut board.store, id, to, &user) {
        Ok(task) => {
            save_or_exit(board, db_path);
            println!("Task {} is now {}.", task.id, format_status(task.status));
        }
        Err(e) => fail(&e),
    }
}

/// Log a time entry for the current user.
pub fn cmd_log(
    board: &mut Board,
    db_path: &Path,
    identifier: &str,
    hours: f64,
    desc: String,
    date: Option<String>,
) {
    let user = require_user(board);
    let id = resolve_task_or_exit(&board.store, identifier);
    let description = desc.trim().to_string();
    if description.is_empty() {
        eprintln!("Description must not be empty.");
        std::process::exit(1);
    }
    let date = date
        .as_deref()
        .map(parse_due_or_exit)
        .unwrap_or_else(|| Local::now().date_naive());

    match board.store.add_time_entry(NewTimeEntry {
        task_id: id,
        user_id: user.id,
        description,
        hours,
        date,
    }) {
        Ok(entry) => {
            save_or_exit(board, db_path);
            let total = board.store.get(id).map(|t| t.total_time_spent).unwrap_or(entry.hours);
            println!("Logged {:.1}h on task {id} ({total:.1}h total)", entry.hours);
        }
        Err(e) => fail(&e),
    }
}

/// Print the daily activity trend as a small text chart.
pub fn cmd_trend(board: &Board, days: u32) {
    let user = require_user(board);
    let tasks = visible_tasks(board, &user);
    for point in query::daily_trend(&tasks, days) {
        println!("{}  {:>3}  {}", point.date, point.count, "#".repeat(point.count));
    }
}

/// Print headline stats for the caller's visible tasks.
pub fn cmd_stats(board: &Board) {
    let user = require_user(board);
    let tasks = visible_tasks(board, &user);
    let s = query::stats(&tasks);
    let today = Local::now().date_naive();
    let overdue = tasks.iter().filter(|t| t.is_overdue(today)).count();
    println!("Active:            {}", s.active);
    println!("Pending approval:  {}", s.pending_approval);
    println!("Closed:            {}", s.closed);
    println!("Critical open:     {}", s.critical);
    println!("Overdue:           {overdue}");
    println!("Total hours:       {:.1}", s.total_hours);
    if user.is_manager() {
        println!("Team members:      {}", s.team_size);
    }
}

/// Print the distinct assignees across the caller's visible tasks.
pub fn cmd_assignees(board: &Board) {
    let user = require_user(board);
    let tasks = visible_tasks(board, &user);
    let mut roster = query::unique_assignees(&tasks);
    roster.sort_by_key(|a| a.id);
    for assignee in roster {
        println!("{:<5} {}", assignee.id, assignee.name);
    }
}

/// Replace the board contents with the demo fixture set.
pub fn cmd_seed(board: &mut Board, db_path: &Path) {
    let tasks = demo_tasks();
    let count = tasks.len();
    board.store = TaskStore::from_tasks(tasks);
    save_or_exit(board, db_path);
    info!(count, "seeded demo tasks");
    println!("Seeded {count} demo tasks.");
}

/// Generate shell completion scripts on stdout.
pub fn cmd_completions(shell: Shell) {
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_due_handles_keywords_and_offsets() {
        let today = Local::now().date_naive();
        assert_eq!(parse_due_input("today"), Some(today));
        assert_eq!(parse_due_input(" Tomorrow "), Some(today + Duration::days(1)));
        assert_eq!(parse_due_input("in 3d"), Some(today + Duration::days(3)));
        assert_eq!(parse_due_input("in 2w"), Some(today + Duration::weeks(2)));
        assert_eq!(
            parse_due_input("2025-06-12"),
            NaiveDate::from_ymd_opt(2025, 6, 12)
        );
        assert_eq!(parse_due_input("someday"), None);
    }

    #[test]
    fn parse_due_weekday_is_the_next_occurrence() {
        let today = Local::now().date_naive();
        let date = parse_due_input("friday").unwrap();
        assert_eq!(date.weekday().num_days_from_monday(), 4);
        let ahead = (date - today).num_days();
        assert!((0..7).contains(&ahead), "{ahead} days ahead");
    }

    #[test]
    fn relative_due_formatting() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 12).unwrap();
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(
            format_due_relative(Some(today + Duration::days(5)), today),
            "in 5d"
        );
        assert_eq!(
            format_due_relative(Some(today - Duration::days(2)), today),
            "2d late"
        );
    }

    #[test]
    fn truncate_respects_character_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long assignee name", 10), "a very lo…");
    }
}
