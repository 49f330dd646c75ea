//! Identity provider: demo user fixtures and the login session.
//!
//! Authentication is deliberately trivial (fixed demo secret, no lockout,
//! no rate limiting). Failure is always the `None` result, never an error.
//! The logged-in user lives in an explicit `Session` value owned by the
//! caller rather than in process-global state, so several sessions can
//! coexist in tests.

use serde::{Deserialize, Serialize};

use crate::fields::Role;

/// Shared secret for the demo fixture accounts.
pub const DEMO_PASSWORD: &str = "password123";

/// A known user. Fixtures are created once at startup and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

/// The built-in demo accounts: one developer, one manager.
pub fn demo_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Avery Chen".to_string(),
            email: "avery@example.dev".to_string(),
            role: Role::Developer,
        },
        User {
            id: 2,
            name: "Morgan Reyes".to_string(),
            email: "morgan@example.dev".to_string(),
            role: Role::Manager,
        },
    ]
}

/// A single-user login session over a fixed user directory.
#[derive(Debug, Clone)]
pub struct Session {
    users: Vec<User>,
    current: Option<u64>,
}

impl Session {
    /// Fresh session with nobody logged in.
    pub fn new(users: Vec<User>) -> Self {
        Session { users, current: None }
    }

    /// Rebuild a session from a persisted user id. Ids that no longer match
    /// a known user resume logged out.
    pub fn resume(users: Vec<User>, current: Option<u64>) -> Self {
        let current = current.filter(|id| users.iter().any(|u| u.id == *id));
        Session { users, current }
    }

    /// Attempt a login. Succeeds only when `email` matches a known user and
    /// `password` equals the demo secret; fails silently otherwise.
    pub fn login(&mut self, email: &str, password: &str) -> Option<User> {
        let user = self.users.iter().find(|u| u.email == email)?;
        if password != DEMO_PASSWORD {
            return None;
        }
        self.current = Some(user.id);
        Some(user.clone())
    }

    /// Clear the current-user slot.
    pub fn logout(&mut self) {
        self.current = None;
    }

    pub fn current_user(&self) -> Option<&User> {
        let id = self.current?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Id of the logged-in user, for persisting the session slot.
    pub fn current_id(&self) -> Option<u64> {
        self.current
    }

    pub fn user_by_id(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Resolve a user from a numeric id or an email address.
    pub fn resolve_user(&self, identifier: &str) -> Option<&User> {
        if let Ok(id) = identifier.parse::<u64>() {
            return self.user_by_id(id);
        }
        self.users.iter().find(|u| u.email == identifier)
    }
}
