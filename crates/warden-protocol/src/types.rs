//! Core identity types.
//!
//! Everything here is plain data. A [`User`] comes from the persistence
//! collaborator, a [`RememberToken`] comes from the visitor, and
//! [`TokenState`] records what the visitor actually sent us before anyone
//! has decided whether to trust it.

use std::fmt;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The unique identifier of a persisted user.
///
/// A newtype over `String` so a user id can't be confused with any other
/// string flowing through a request (a path, a cookie name, a secret).
///
/// `#[serde(transparent)]` serializes `UserId("u1")` as just `"u1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A pre-hashed credential secret.
///
/// Warden never hashes anything. The persistence collaborator stores a
/// hash, the login flow copies that same hash into the remember-me
/// cookie, and Warden compares the two as opaque values.
///
/// Two things differ from a plain `String`:
///
/// - `PartialEq` runs in constant time (via `subtle`), so the time taken
///   to reject a forged secret doesn't depend on how many leading bytes
///   it got right.
/// - `Debug` is redacted, so a secret can't end up in a log line through
///   `{:?}` on a surrounding struct.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialSecret(String);

impl CredentialSecret {
    /// Wraps an already-hashed secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw hashed value.
    ///
    /// Only codecs should need this, to write the secret back into a
    /// cookie.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for CredentialSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for CredentialSecret {}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialSecret(<redacted>)")
    }
}

/// A persisted user record, as handed to us by the persistence layer.
///
/// Read-only from Warden's point of view. Once resolved it is copied into
/// the session and the request context, where rendering code may read
/// `display_name` to personalize output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,

    /// Stored credential hash.
    pub secret: CredentialSecret,

    /// Optional human-readable name for templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl User {
    /// Creates a user with no display name.
    pub fn new(id: impl Into<UserId>, secret: CredentialSecret) -> Self {
        Self {
            id: id.into(),
            secret,
            display_name: None,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// RememberToken
// ---------------------------------------------------------------------------

/// The credential pair a visitor carries in their "remember me" cookie.
///
/// Untrusted by construction: holding a `RememberToken` says nothing
/// about whether it is valid. Only the resolver, after looking up `uid`,
/// decides that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberToken {
    /// The user the visitor claims to be.
    pub uid: UserId,

    /// The hashed secret the visitor presents.
    pub secret: CredentialSecret,
}

impl RememberToken {
    /// Builds a token from its two parts.
    pub fn new(uid: impl Into<UserId>, secret: CredentialSecret) -> Self {
        Self {
            uid: uid.into(),
            secret,
        }
    }

    /// Builds the token the login flow should hand out for `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            uid: user.id.clone(),
            secret: user.secret.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenState
// ---------------------------------------------------------------------------

/// What the visitor sent in place of a remember-me token.
///
/// There are three cases, and the distinction between the last two is
/// the whole point of this type:
///
/// - **Absent**: no cookie, or a cookie with neither field. The visitor
///   is simply anonymous and nothing needs cleaning up.
/// - **Present**: both fields are there. Still untrusted.
/// - **Malformed**: something is there but it can't be a valid token
///   (one field missing, an empty field, garbage bytes). This is treated
///   exactly like a failed verification, which means the cookie gets
///   cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// Nothing to verify.
    Absent,

    /// A structurally complete token awaiting verification.
    Present(RememberToken),

    /// A token that can't be verified. The reason is for server logs only.
    Malformed(String),
}

impl TokenState {
    /// Classifies a pair of optional raw fields.
    ///
    /// Both missing means [`TokenState::Absent`]; both present and
    /// non-empty means [`TokenState::Present`]; every other combination
    /// is [`TokenState::Malformed`].
    pub fn from_fields(uid: Option<String>, secret: Option<String>) -> Self {
        match (uid, secret) {
            (None, None) => Self::Absent,
            (Some(uid), Some(secret)) => {
                if uid.is_empty() {
                    Self::Malformed("empty uid".into())
                } else if secret.is_empty() {
                    Self::Malformed("empty secret".into())
                } else {
                    Self::Present(RememberToken::new(
                        uid,
                        CredentialSecret::new(secret),
                    ))
                }
            }
            (Some(_), None) => Self::Malformed("missing secret".into()),
            (None, Some(_)) => Self::Malformed("missing uid".into()),
        }
    }

    /// Returns `true` unless the state is [`TokenState::Absent`].
    ///
    /// A malformed token still counts as "present": the visitor is
    /// holding a cookie that has to be cleared.
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}
