//! User filter over the reconciled annotation set.
//!
//! A checklist of every distinct author in the primary set. Toggling entries
//! narrows the current view; the "all" state is derived, never stored. Every
//! effective change broadcasts [`SessionEvent::FilterChanged`] with the
//! active-user list, and consumers treat that broadcast as the sole trigger
//! for view recomputation.

use std::sync::{Arc, Mutex};

use tracing::debug;

use margo_core::{Annotation, EventBus, SessionEvent};

/// Shared handle to a session's user filter.
pub type SharedUserFilter = Arc<Mutex<UserFilter>>;

/// Outcome of registering an annotation author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The author was already known and active.
    AlreadyActive,
    /// The author was unknown and is now registered active.
    Registered,
    /// The author was known but deactivated, and is active again. Their
    /// other annotations just became visible, so a full repaint is due.
    Reactivated,
}

#[derive(Debug, Clone)]
struct UserEntry {
    userid: String,
    active: bool,
}

/// Checklist of annotation authors with per-user active flags.
#[derive(Debug)]
pub struct UserFilter {
    events: EventBus,
    users: Vec<UserEntry>,
}

impl UserFilter {
    pub fn new(events: EventBus) -> Self {
        Self {
            events,
            users: Vec::new(),
        }
    }

    /// Every known author, in first-seen order.
    pub fn known_users(&self) -> Vec<String> {
        self.users.iter().map(|u| u.userid.clone()).collect()
    }

    /// Authors whose annotations are currently visible.
    pub fn active_users(&self) -> Vec<String> {
        self.users
            .iter()
            .filter(|u| u.active)
            .map(|u| u.userid.clone())
            .collect()
    }

    /// Whether annotations by this user pass the filter.
    ///
    /// Unknown users pass: a fresh author is visible until someone
    /// deactivates them.
    pub fn allows(&self, userid: &str) -> bool {
        self.users
            .iter()
            .find(|u| u.userid == userid)
            .map(|u| u.active)
            .unwrap_or(true)
    }

    /// Derived master state: true iff no individual user is unchecked.
    pub fn all_active(&self) -> bool {
        self.users.iter().all(|u| u.active)
    }

    /// Register an annotation author, activating them if needed.
    ///
    /// Called when a new annotation arrives. Broadcasts only when the
    /// active set actually changed.
    pub fn register_author(&mut self, userid: &str) -> RegisterOutcome {
        if let Some(entry) = self.users.iter_mut().find(|u| u.userid == userid) {
            if entry.active {
                return RegisterOutcome::AlreadyActive;
            }
            entry.active = true;
            debug!(user = userid, "Reactivated author in user filter");
            self.broadcast();
            return RegisterOutcome::Reactivated;
        }
        self.users.push(UserEntry {
            userid: userid.to_string(),
            active: true,
        });
        debug!(user = userid, "Registered new author in user filter");
        self.broadcast();
        RegisterOutcome::Registered
    }

    /// Check a single user. Returns true when the state changed.
    pub fn activate(&mut self, userid: &str) -> bool {
        self.set_active(userid, true)
    }

    /// Uncheck a single user. Returns true when the state changed.
    pub fn deactivate(&mut self, userid: &str) -> bool {
        self.set_active(userid, false)
    }

    fn set_active(&mut self, userid: &str, active: bool) -> bool {
        let Some(entry) = self.users.iter_mut().find(|u| u.userid == userid) else {
            return false;
        };
        if entry.active == active {
            return false;
        }
        entry.active = active;
        self.broadcast();
        true
    }

    /// Check every user (master toggle on).
    pub fn activate_all(&mut self) {
        self.set_all(true);
    }

    /// Uncheck every user (master toggle off).
    pub fn deactivate_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, active: bool) {
        let mut changed = false;
        for entry in &mut self.users {
            if entry.active != active {
                entry.active = active;
                changed = true;
            }
        }
        if changed {
            self.broadcast();
        }
    }

    /// Rebuild the checklist from a fresh annotation set.
    ///
    /// Authors present in the set keep their previous active state; authors
    /// no longer present are dropped; unseen authors register active.
    /// Replies never contribute authors.
    pub fn rebuild(&mut self, annotations: &[Annotation]) {
        let before = self.active_users();
        let mut rebuilt: Vec<UserEntry> = Vec::new();
        for annotation in annotations.iter().filter(|a| !a.is_reply()) {
            if rebuilt.iter().any(|u| u.userid == annotation.user) {
                continue;
            }
            let active = self
                .users
                .iter()
                .find(|u| u.userid == annotation.user)
                .map(|u| u.active)
                .unwrap_or(true);
            rebuilt.push(UserEntry {
                userid: annotation.user.clone(),
                active,
            });
        }
        self.users = rebuilt;
        let after = self.active_users();
        if before != after {
            debug!(user_count = self.users.len(), "User filter rebuilt");
            self.broadcast();
        }
    }

    fn broadcast(&self) {
        self.events.emit(SessionEvent::FilterChanged {
            active_users: self.active_users(),
        });
    }
}
