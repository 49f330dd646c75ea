//! Status workflow gate.
//!
//! A single transition table answers both questions the front-end has to
//! ask: which actions to offer for a task, and whether a requested status
//! change is legal. Keeping one table means the two can never disagree.
//!
//! The lifecycle is `Open -> InProgress -> PendingApproval -> {Closed |
//! Reopened}`, with `Reopened -> InProgress` to resume. Moving into
//! `PendingApproval` is the assignee's (or a manager's) call; leaving it is
//! a manager's.

use tracing::debug;

use crate::auth::User;
use crate::error::{Error, Result};
use crate::fields::Status;
use crate::store::TaskStore;
use crate::task::Task;

/// Whether the status change appears in the transition table at all,
/// regardless of who is asking.
pub fn transition_allowed(from: Status, to: Status) -> bool {
    matches!(
        (from, to),
        (Status::Open, Status::InProgress)
            | (Status::InProgress, Status::PendingApproval)
            | (Status::PendingApproval, Status::Closed)
            | (Status::PendingApproval, Status::Reopened)
            | (Status::Reopened, Status::InProgress)
    )
}

/// Whether this caller may request the given transition on this task:
/// the table must allow it, and closing or reopening is reserved for
/// managers while the rest is open to the assignee as well.
pub fn may_request(task: &Task, to: Status, user: &User) -> bool {
    if !transition_allowed(task.status, to) {
        return false;
    }
    match to {
        Status::Closed | Status::Reopened => user.is_manager(),
        _ => user.is_manager() || task.assignee_id == user.id,
    }
}

/// The transitions this user could request on this task right now. The
/// front-end renders its action buttons from exactly this list.
pub fn available_transitions(task: &Task, user: &User) -> Vec<Status> {
    [
        Status::Open,
        Status::InProgress,
        Status::PendingApproval,
        Status::Closed,
        Status::Reopened,
    ]
    .into_iter()
    .filter(|&to| may_request(task, to, user))
    .collect()
}

/// Validate and apply a status transition.
///
/// Rejections report `InvalidTransition` whether the table or the caller's
/// role is what stands in the way, and leave the task untouched. Closing a
/// task stamps the close time and the approving manager atomically with the
/// status write.
pub fn transition(store: &mut TaskStore, id: u64, to: Status, actor: &User) -> Result<Task> {
    let task = store.get(id).ok_or(Error::TaskNotFound(id))?;
    let from = task.status;
    if !may_request(task, to, actor) {
        return Err(Error::InvalidTransition { from, to });
    }

    let approver = (to == Status::Closed).then_some(actor.id);
    debug!(id, ?from, ?to, actor = actor.id, "transition accepted");
    store
        .set_status(id, to, approver)
        .ok_or(Error::TaskNotFound(id))
}

/// Free-form fields (title, description, type, priority, assignee, due) may
/// be edited by the assignee or a manager.
pub fn can_edit(task: &Task, user: &User) -> bool {
    user.is_manager() || task.assignee_id == user.id
}

/// Deletion is for the reporter or a manager, and only while the task is
/// not closed; closed tasks stay as historical record.
pub fn can_delete(task: &Task, user: &User) -> bool {
    (user.is_manager() || task.reporter_id == user.id) && task.status != Status::Closed
}
