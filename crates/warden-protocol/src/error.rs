//! Error types for the protocol layer.
//!
//! Like every Warden crate, the protocol layer owns its error enum. A
//! `ProtocolError` always means "the remember-me cookie could not be
//! read or written", never "the visitor is not who they claim to be".

/// Errors that can occur while encoding or decoding a remember-me token.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing the token into its cookie form failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The cookie value is not valid JSON, or not a JSON object.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The cookie value decoded, but violates the token shape: bad
    /// percent-encoding, a field of the wrong type, and so on.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}
