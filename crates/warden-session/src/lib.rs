//! Identity resolution for Warden.
//!
//! This crate answers one question per request: *who is this visitor?*
//!
//! 1. **Session**: the cheap path. If the visitor's [`Session`] already
//!    holds a user, that's the answer.
//! 2. **Remember-me**: the fallback. If the visitor carries a
//!    [`RememberToken`](warden_protocol::RememberToken), look the user up
//!    through the [`UserLookup`] collaborator and compare secrets.
//! 3. **Anonymous**: everything else, including every kind of failure.
//!
//! The answer lands in a [`RequestContext`]. Resolution never blocks a
//! request and never redirects; enforcing a login is the gate's job.
//!
//! # How it fits in the stack
//!
//! ```text
//! Gate Layer (above)  ← reads RequestContext, allows or redirects
//!     ↕
//! Session Layer (this crate)  ← resolves identity, decides side effects
//!     ↕
//! Protocol Layer (below)  ← provides User, TokenState
//! ```

mod error;
mod lookup;
mod resolver;
mod session;

pub use error::LookupError;
pub use lookup::UserLookup;
pub use resolver::{resolve, Effects, Outcome, Resolution, TokenEffect};
pub use session::{RequestContext, Session};
