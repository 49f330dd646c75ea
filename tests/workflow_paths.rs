//! End-to-end engine scenarios: a task's full life from creation through
//! approval, driven the way a front-end would drive it.

use chrono::{Duration, Local};

use bugtrack::auth::demo_users;
use bugtrack::error::Error;
use bugtrack::fields::{Priority, Status, TaskType};
use bugtrack::query;
use bugtrack::store::TaskStore;
use bugtrack::task::{NewTask, NewTimeEntry};
use bugtrack::workflow;

fn new_task(assignee_id: u64, reporter_id: u64) -> NewTask {
    let users = demo_users();
    let name_of = |id: u64| {
        users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    };
    NewTask {
        title: "Crash when saving an empty draft".to_string(),
        description: "Saving a draft with no content panics the editor.".to_string(),
        kind: TaskType::Bug,
        priority: Priority::High,
        status: Status::Open,
        assignee_id,
        assignee_name: name_of(assignee_id),
        reporter_id,
        reporter_name: name_of(reporter_id),
        due: None,
    }
}

#[test]
fn a_task_travels_from_open_to_closed_with_time_logged() {
    let users = demo_users();
    let dev = &users[0];
    let mgr = &users[1];
    let mut store = TaskStore::default();
    let id = store.create(new_task(dev.id, mgr.id)).id;

    workflow::transition(&mut store, id, Status::InProgress, dev).unwrap();

    let today = Local::now().date_naive();
    store
        .add_time_entry(NewTimeEntry {
            task_id: id,
            user_id: dev.id,
            description: "Reproduced and wrote a failing test".to_string(),
            hours: 1.5,
            date: today - Duration::days(1),
        })
        .unwrap();
    store
        .add_time_entry(NewTimeEntry {
            task_id: id,
            user_id: dev.id,
            description: "Fixed the nil check in the save path".to_string(),
            hours: 2.0,
            date: today,
        })
        .unwrap();
    assert_eq!(store.get(id).unwrap().total_time_spent, 3.5);

    workflow::transition(&mut store, id, Status::PendingApproval, dev).unwrap();
    let closed = workflow::transition(&mut store, id, Status::Closed, mgr).unwrap();

    assert_eq!(closed.status, Status::Closed);
    assert!(closed.closed_at_utc.is_some());
    assert_eq!(closed.approved_by, Some(mgr.id));
}

#[test]
fn a_developer_cannot_shortcut_to_closed() {
    let users = demo_users();
    let dev = &users[0];
    let mgr = &users[1];
    let mut store = TaskStore::default();
    let id = store.create(new_task(dev.id, mgr.id)).id;

    workflow::transition(&mut store, id, Status::InProgress, dev).unwrap();
    let err = workflow::transition(&mut store, id, Status::Closed, dev).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition { from: Status::InProgress, to: Status::Closed }
    ));
    assert_eq!(store.get(id).unwrap().status, Status::InProgress);
}

#[test]
fn a_rejected_task_goes_around_the_loop_again() {
    let users = demo_users();
    let dev = &users[0];
    let mgr = &users[1];
    let mut store = TaskStore::default();
    let id = store.create(new_task(dev.id, mgr.id)).id;

    workflow::transition(&mut store, id, Status::InProgress, dev).unwrap();
    workflow::transition(&mut store, id, Status::PendingApproval, dev).unwrap();
    workflow::transition(&mut store, id, Status::Reopened, mgr).unwrap();
    workflow::transition(&mut store, id, Status::InProgress, dev).unwrap();
    workflow::transition(&mut store, id, Status::PendingApproval, dev).unwrap();
    let closed = workflow::transition(&mut store, id, Status::Closed, mgr).unwrap();
    assert_eq!(closed.status, Status::Closed);
}

#[test]
fn trend_over_the_store_counts_window_entries() {
    let users = demo_users();
    let dev = &users[0];
    let mgr = &users[1];
    let mut store = TaskStore::default();
    let a = store.create(new_task(dev.id, mgr.id)).id;
    let b = store.create(new_task(dev.id, mgr.id)).id;

    let today = Local::now().date_naive();
    for (task, ago) in [(a, 0), (a, 1), (b, 1), (b, 30)] {
        store
            .add_time_entry(NewTimeEntry {
                task_id: task,
                user_id: dev.id,
                description: "work".to_string(),
                hours: 1.0,
                date: today - Duration::days(ago),
            })
            .unwrap();
    }

    let trend = query::daily_trend_from(&store.list(), today, 7);
    assert_eq!(trend.len(), 7);
    let total: usize = trend.iter().map(|p| p.count).sum();
    assert_eq!(total, 3, "the 30-day-old entry is outside the window");
    assert_eq!(trend[6].count, 1);
    assert_eq!(trend[5].count, 2);
}

#[test]
fn failed_operations_leave_the_store_as_it_was() {
    let users = demo_users();
    let dev = &users[0];
    let mgr = &users[1];
    let mut store = TaskStore::default();
    let id = store.create(new_task(dev.id, mgr.id)).id;
    let before = store.get(id).unwrap().clone();

    store
        .add_time_entry(NewTimeEntry {
            task_id: 999,
            user_id: dev.id,
            description: "lost work".to_string(),
            hours: 1.0,
            date: Local::now().date_naive(),
        })
        .unwrap_err();
    workflow::transition(&mut store, id, Status::Closed, mgr).unwrap_err();

    let after = store.get(id).unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.updated_at_utc, before.updated_at_utc);
    assert_eq!(after.total_time_spent, before.total_time_spent);
    assert_eq!(store.len(), 1);
}
