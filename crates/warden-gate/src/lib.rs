//! Login enforcement for Warden.
//!
//! The gate runs after identity resolution, and only on routes that
//! require a logged-in visitor. It makes one binary decision:
//!
//! - the [`RequestContext`](warden_session::RequestContext) has a user →
//!   [`Access::Allow`];
//! - it doesn't → [`Access::Redirect`] to the login page, carrying the
//!   original path so the login flow can send the visitor back.
//!
//! The gate never looks at sessions or cookies, and it has no failure
//! modes of its own. Anything that can go wrong is caught when the
//! [`GateConfig`] is validated.

mod config;
mod error;
mod gate;

pub use config::GateConfig;
pub use error::GateError;
pub use gate::{Access, AccessGate};
