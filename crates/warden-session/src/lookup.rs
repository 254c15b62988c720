//! The user persistence hook.
//!
//! Warden doesn't store users. Whatever does (a SQL table, an ORM model,
//! a remote account service) is plugged in through the [`UserLookup`]
//! trait: a single async method that takes an identifier and returns the
//! stored record, if there is one.

use std::collections::HashMap;
use std::sync::Arc;

use warden_protocol::{User, UserId};

use crate::LookupError;

/// Finds a persisted user by identifier.
///
/// This is the only suspending operation in identity resolution. It is
/// called at most once per request, and only when the session is empty
/// and the visitor holds a structurally complete remember-me token.
///
/// # Trait bounds
///
/// - `Send + Sync` → one lookup instance serves every concurrent request.
/// - `'static` → it lives as long as the pipeline that owns it.
///
/// # Example
///
/// ```rust
/// use warden_protocol::{User, UserId};
/// use warden_session::{LookupError, UserLookup};
///
/// /// Knows exactly one user.
/// struct SingleUser(User);
///
/// impl UserLookup for SingleUser {
///     async fn find_by_identifier(
///         &self,
///         uid: &UserId,
///     ) -> Result<Option<User>, LookupError> {
///         Ok((self.0.id == *uid).then(|| self.0.clone()))
///     }
/// }
/// ```
pub trait UserLookup: Send + Sync + 'static {
    /// Returns the user with identifier `uid`.
    ///
    /// # Returns
    /// - `Ok(Some(user))`: the record exists
    /// - `Ok(None)`: no such user
    /// - `Err(LookupError)`: the backend could not answer
    fn find_by_identifier(
        &self,
        uid: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, LookupError>> + Send;
}

/// Shared lookups: an `Arc<L>` looks users up through `L`.
impl<L: UserLookup> UserLookup for Arc<L> {
    async fn find_by_identifier(
        &self,
        uid: &UserId,
    ) -> Result<Option<User>, LookupError> {
        L::find_by_identifier(self, uid).await
    }
}

/// A fixed in-memory user table. Handy for tests and demos.
impl UserLookup for HashMap<UserId, User> {
    async fn find_by_identifier(
        &self,
        uid: &UserId,
    ) -> Result<Option<User>, LookupError> {
        Ok(self.get(uid).cloned())
    }
}
