//! Error types for the session layer.

/// Errors a [`UserLookup`](crate::UserLookup) implementation may report.
///
/// The resolver never passes these on. A lookup that fails is handled
/// exactly like a lookup that finds nobody: the remember-me token is
/// cleared and the visitor stays anonymous. The error only shows up in
/// server logs.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The persistence backend could not answer (connection lost, query
    /// failed, timeout in the driver, ...).
    #[error("user lookup failed: {0}")]
    Backend(String),
}
