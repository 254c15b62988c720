//! The identity resolver: session first, remember-me second.
//!
//! [`resolve`] is a decision function. It takes snapshots of everything
//! it needs (the session's user, the visitor's token, a lookup) and
//! returns a [`Resolution`]: the context to attach to the request, plus
//! the side effects the caller must apply. It mutates nothing itself,
//! which keeps it testable without a live request or response.
//!
//! ```text
//! session user? ──yes──→ SessionHit
//!      │no
//! token present? ──no──→ Anonymous
//!      │yes
//! lookup(uid) ──none/err──→ Rejected (clear token)
//!      │user
//! secrets equal? ──no──→ Rejected (clear token)
//!      │yes
//! Remembered (store user in session)
//! ```

use std::fmt;

use warden_protocol::{RememberToken, TokenState, User};

use crate::{LookupError, RequestContext, Session, UserLookup};

// ---------------------------------------------------------------------------
// Resolution types
// ---------------------------------------------------------------------------

/// How the visitor's identity was (or wasn't) established.
///
/// Callers can log or count these, but must not show them to the
/// visitor: `Rejected` deliberately hides *why* a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The session already held a user.
    SessionHit,

    /// No session user and no remember-me token.
    Anonymous,

    /// A remember-me token was verified against the stored user.
    Remembered,

    /// A remember-me token was present but could not be verified.
    Rejected,
}

impl Outcome {
    /// Returns `true` if the visitor ended up identified.
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::SessionHit | Self::Remembered)
    }
}

/// What to do with the visitor's remember-me token after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenEffect {
    /// Leave it alone. Warden never rotates or extends a token.
    #[default]
    Keep,

    /// Remove it from the visitor.
    Clear,
}

/// Side effects decided by [`resolve`], applied separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    /// A user to write into the session. Set only after a successful
    /// remember-me verification.
    pub session_user: Option<User>,

    /// What to do with the remember-me token.
    pub token: TokenEffect,
}

impl Effects {
    /// No side effects at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns `true` if applying these effects would change nothing.
    pub fn is_empty(&self) -> bool {
        self.session_user.is_none() && self.token == TokenEffect::Keep
    }

    /// Writes the session part of the effects and hands back the token
    /// part, which belongs to whatever transport carries the token.
    pub fn apply(self, session: &mut Session) -> TokenEffect {
        if let Some(user) = self.session_user {
            session.set_current_user(user);
        }
        self.token
    }
}

/// The result of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The context to attach to the request.
    pub context: RequestContext,

    /// Side effects the caller must apply before responding.
    pub effects: Effects,

    /// Which branch produced this resolution.
    pub outcome: Outcome,
}

impl Resolution {
    fn session_hit(user: User) -> Self {
        Self {
            context: RequestContext::authenticated(user),
            effects: Effects::none(),
            outcome: Outcome::SessionHit,
        }
    }

    fn anonymous() -> Self {
        Self {
            context: RequestContext::anonymous(),
            effects: Effects::none(),
            outcome: Outcome::Anonymous,
        }
    }

    fn remembered(user: User) -> Self {
        Self {
            context: RequestContext::authenticated(user.clone()),
            effects: Effects {
                session_user: Some(user),
                token: TokenEffect::Keep,
            },
            outcome: Outcome::Remembered,
        }
    }

    fn rejected() -> Self {
        Self {
            context: RequestContext::anonymous(),
            effects: Effects {
                session_user: None,
                token: TokenEffect::Clear,
            },
            outcome: Outcome::Rejected,
        }
    }

    /// Applies the effects to `session` and splits the resolution into
    /// the request context and the remaining token instruction.
    pub fn apply(self, session: &mut Session) -> (RequestContext, TokenEffect) {
        let token = self.effects.apply(session);
        (self.context, token)
    }
}

// ---------------------------------------------------------------------------
// Rejection reasons (server-side only)
// ---------------------------------------------------------------------------

/// Why a remember-me token was refused. Logged, never returned.
enum Rejection {
    Malformed(String),
    UnknownUser,
    SecretMismatch,
    Lookup(LookupError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed token: {reason}"),
            Self::UnknownUser => f.write_str("unknown user"),
            Self::SecretMismatch => f.write_str("secret mismatch"),
            Self::Lookup(e) => write!(f, "{e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// resolve()
// ---------------------------------------------------------------------------

/// Resolves the visitor's identity.
///
/// Steps, first match wins:
///
/// 1. `session_user` is set → [`Outcome::SessionHit`]. The token is not
///    even looked at.
/// 2. `token` is [`TokenState::Absent`] → [`Outcome::Anonymous`], no
///    side effects.
/// 3. Otherwise look up the token's `uid` and compare secrets. Success
///    is [`Outcome::Remembered`] and the user is stored in the session;
///    the token is kept as is.
/// 4. Any failure (malformed token, unknown user, wrong secret, lookup
///    error) is [`Outcome::Rejected`]: anonymous, token cleared.
///
/// Never fails and never redirects.
pub async fn resolve<L: UserLookup>(
    session_user: Option<&User>,
    token: &TokenState,
    lookup: &L,
) -> Resolution {
    if let Some(user) = session_user {
        tracing::debug!(user_id = %user.id, "identity resolved from session");
        return Resolution::session_hit(user.clone());
    }

    let token = match token {
        TokenState::Absent => {
            tracing::debug!("no session user and no remember-me token");
            return Resolution::anonymous();
        }
        TokenState::Malformed(reason) => {
            return reject(Rejection::Malformed(reason.clone()), None);
        }
        TokenState::Present(token) => token,
    };

    match verify(token, lookup).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "visitor remembered");
            Resolution::remembered(user)
        }
        Err(rejection) => reject(rejection, Some(token)),
    }
}

/// Looks up the token's user and checks the secret.
async fn verify<L: UserLookup>(
    token: &RememberToken,
    lookup: &L,
) -> Result<User, Rejection> {
    let user = lookup
        .find_by_identifier(&token.uid)
        .await
        .map_err(Rejection::Lookup)?
        .ok_or(Rejection::UnknownUser)?;

    // Both sides are already hashed; `CredentialSecret` compares in
    // constant time.
    if user.secret != token.secret {
        return Err(Rejection::SecretMismatch);
    }

    Ok(user)
}

fn reject(rejection: Rejection, token: Option<&RememberToken>) -> Resolution {
    match token {
        Some(token) => tracing::warn!(
            claimed_uid = %token.uid,
            reason = %rejection,
            "remember-me token rejected"
        ),
        None => tracing::warn!(
            reason = %rejection,
            "remember-me token rejected"
        ),
    }
    Resolution::rejected()
}
