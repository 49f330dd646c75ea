//! Enumerations and field types for task tracking.
//!
//! This module defines the structured data types used to categorise tasks:
//! task types, priorities, lifecycle statuses, and the two user roles.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Category of tracked work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Bug,
    Task,
    Feature,
    Improvement,
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Task lifecycle status.
///
/// Legal movements between statuses are defined by the transition table in
/// the `workflow` module; the store itself treats this as an opaque field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Open,
    InProgress,
    PendingApproval,
    Closed,
    Reopened,
}

/// User role. Managers approve and reopen work and see every task;
/// developers see only tasks assigned to them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Developer,
    Manager,
}

/// Format a task type for display.
pub fn format_type(t: TaskType) -> &'static str {
    match t {
        TaskType::Bug => "Bug",
        TaskType::Task => "Task",
        TaskType::Feature => "Feature",
        TaskType::Improvement => "Improvement",
    }
}

/// Format a priority level for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Critical => "Critical",
    }
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Open => "Open",
        Status::InProgress => "In Progress",
        Status::PendingApproval => "Pending Approval",
        Status::Closed => "Closed",
        Status::Reopened => "Reopened",
    }
}

/// Format a role for display.
pub fn format_role(r: Role) -> &'static str {
    match r {
        Role::Developer => "Developer",
        Role::Manager => "Manager",
    }
}
