//! Unified error type for Warden.

use warden_gate::GateError;
use warden_protocol::ProtocolError;
use warden_session::LookupError;

/// Top-level error that wraps every crate-specific error.
///
/// Identity resolution itself never returns an error. `WardenError`
/// shows up when building a [`Warden`](crate::Warden), when issuing a
/// remember-me cookie, and in app code that wants one error type for
/// its own `UserLookup` plumbing. The `#[from]` attributes let `?`
/// convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WardenError {
    /// A remember-me cookie could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The user store failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The gate configuration is invalid.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Some other part of the configuration is invalid.
    #[error("invalid config: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidToken("bad".into());
        let warden_err: WardenError = err.into();
        assert!(matches!(warden_err, WardenError::Protocol(_)));
        assert!(warden_err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_lookup_error() {
        let err = LookupError::Backend("down".into());
        let warden_err: WardenError = err.into();
        assert!(matches!(warden_err, WardenError::Lookup(_)));
        assert!(warden_err.to_string().contains("down"));
    }

    #[test]
    fn test_from_gate_error() {
        let err = GateError::InvalidConfig("nope".into());
        let warden_err: WardenError = err.into();
        assert!(matches!(warden_err, WardenError::Gate(_)));
    }
}
