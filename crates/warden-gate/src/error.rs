//! Error types for the gate layer.

/// Errors raised while building an [`AccessGate`](crate::AccessGate).
///
/// Only configuration can be wrong. Once a gate exists, every call to
/// `require` returns a decision.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The login path or redirect parameter is unusable.
    #[error("invalid gate config: {0}")]
    InvalidConfig(String),
}
