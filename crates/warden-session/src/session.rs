//! Per-visitor and per-request state.
//!
//! Two small containers with very different lifetimes:
//!
//! - [`Session`] survives across requests. The session store (not part
//!   of Warden) loads it before the request and saves it afterwards.
//! - [`RequestContext`] lives for one request only. It is what route
//!   handlers and templates read to find out who is logged in.

use serde::{Deserialize, Serialize};
use warden_protocol::User;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Server-side state for one visitor.
///
/// Holds at most one thing: the user this visitor has been resolved to.
/// The session store decides how a `Session` is keyed and where it is
/// kept; `Serialize`/`Deserialize` are derived so any store can persist
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(
        default,
        rename = "currentUser",
        skip_serializing_if = "Option::is_none"
    )]
    current_user: Option<User>,
}

impl Session {
    /// Creates an empty session (nobody logged in).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session already holding `user`, as the login flow leaves
    /// it after an interactive login.
    pub fn with_user(user: User) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    /// The user this session is logged in as, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Records `user` as this visitor's identity.
    pub fn set_current_user(&mut self, user: User) {
        self.current_user = Some(user);
    }

    /// Forgets the current user and returns it. Used by logout.
    pub fn take_current_user(&mut self) -> Option<User> {
        self.current_user.take()
    }

    /// Returns `true` if a user is recorded.
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}

// ---------------------------------------------------------------------------
// RequestContext
// ---------------------------------------------------------------------------

/// Per-request scratch space filled in by identity resolution.
///
/// `current_user` is `Some` if and only if the session already held a
/// user, or a remember-me token was verified during this request. It is
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The visitor's resolved identity.
    pub current_user: Option<User>,
}

impl RequestContext {
    /// A context for a visitor nobody could identify.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for a resolved user.
    pub fn authenticated(user: User) -> Self {
        Self {
            current_user: Some(user),
        }
    }

    /// The resolved user, if any.
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Returns `true` if the visitor was identified.
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }
}
