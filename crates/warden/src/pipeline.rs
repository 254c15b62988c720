//! `Warden` builder and the per-request pipeline.
//!
//! This ties the layers together: cookie → protocol → session → gate.

use serde::{Deserialize, Serialize};
use warden_gate::{Access, AccessGate, GateConfig};
use warden_protocol::{JsonCookieCodec, RememberToken, TokenCodec, User};
use warden_session::{resolve, RequestContext, Session, TokenEffect, UserLookup};

use crate::{CookieJar, WardenError};

/// Whether a route needs a logged-in visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteAccess {
    /// Anyone may see it. Identity is still resolved, so pages can be
    /// personalized when a session happens to exist.
    #[default]
    Public,

    /// Anonymous visitors are redirected to the login page.
    Protected,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Remember-me cookie settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RememberConfig {
    /// Name of the cookie holding the remember-me token.
    ///
    /// Default: `last_logged_in_user`.
    pub cookie_name: String,
}

impl Default for RememberConfig {
    fn default() -> Self {
        Self {
            cookie_name: "last_logged_in_user".to_string(),
        }
    }
}

/// All of Warden's settings in one place, so an app can keep them in
/// its own config file.
///
/// ```rust
/// use warden::WardenConfig;
///
/// let config: WardenConfig = serde_json::from_str(
///     r#"{ "gate": { "login_path": "/signin" } }"#,
/// ).unwrap();
/// assert_eq!(config.gate.login_path, "/signin");
/// assert_eq!(config.remember.cookie_name, "last_logged_in_user");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Login redirect settings.
    pub gate: GateConfig,

    /// Remember-me cookie settings.
    pub remember: RememberConfig,
}

// ---------------------------------------------------------------------------
// WardenBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`Warden`].
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use warden::prelude::*;
///
/// let users: HashMap<UserId, User> = HashMap::new();
/// let warden = WardenBuilder::new()
///     .login_path("/signin")
///     .redirect_param("next")
///     .build(users)
///     .expect("valid config");
/// assert_eq!(warden.gate().login_redirect("/a"), "/signin?next=/a");
/// ```
#[derive(Debug, Clone, Default)]
pub struct WardenBuilder {
    config: WardenConfig,
}

impl WardenBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the login entry point.
    pub fn login_path(mut self, path: &str) -> Self {
        self.config.gate.login_path = path.to_string();
        self
    }

    /// Sets the query parameter that carries the original path.
    pub fn redirect_param(mut self, param: &str) -> Self {
        self.config.gate.redirect_param = param.to_string();
        self
    }

    /// Sets the remember-me cookie name.
    pub fn cookie_name(mut self, name: &str) -> Self {
        self.config.remember.cookie_name = name.to_string();
        self
    }

    /// Builds a `Warden` that reads JSON remember-me cookies.
    ///
    /// # Errors
    /// Returns [`WardenError`] if the configuration is invalid.
    pub fn build<L: UserLookup>(
        self,
        lookup: L,
    ) -> Result<Warden<L, JsonCookieCodec>, WardenError> {
        self.build_with_codec(lookup, JsonCookieCodec)
    }

    /// Builds a `Warden` with a custom cookie codec.
    ///
    /// # Errors
    /// Returns [`WardenError`] if the configuration is invalid.
    pub fn build_with_codec<L: UserLookup, C: TokenCodec>(
        self,
        lookup: L,
        codec: C,
    ) -> Result<Warden<L, C>, WardenError> {
        let cookie_name = &self.config.remember.cookie_name;
        if cookie_name.is_empty()
            || cookie_name
                .chars()
                .any(|c| matches!(c, ';' | ',' | '=') || c.is_whitespace())
        {
            return Err(WardenError::Config(format!(
                "invalid remember-me cookie name: {cookie_name:?}"
            )));
        }

        let gate = AccessGate::new(self.config.gate)?;

        Ok(Warden {
            lookup,
            codec,
            gate,
            remember: self.config.remember,
        })
    }
}

// ---------------------------------------------------------------------------
// Warden
// ---------------------------------------------------------------------------

/// The per-request pipeline.
///
/// Holds the app's user lookup, the cookie codec, and the gate. One
/// instance is shared by every request (wrap it in an `Arc` if your
/// framework needs `'static` state); each call works only on the
/// session and cookies it is handed.
pub struct Warden<L: UserLookup, C: TokenCodec = JsonCookieCodec> {
    lookup: L,
    codec: C,
    gate: AccessGate,
    remember: RememberConfig,
}

impl<L: UserLookup, C: TokenCodec> Warden<L, C> {
    /// The gate used by [`require`](Self::require).
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    /// The remember-me cookie name.
    pub fn cookie_name(&self) -> &str {
        &self.remember.cookie_name
    }

    /// Resolves the visitor's identity and applies the side effects.
    ///
    /// On return the session holds the user if a remember-me token was
    /// just verified, and the remember-me cookie has been removed from
    /// `jar` if it failed verification. Both happen before this returns,
    /// so the caller can't send a response ahead of them.
    pub async fn resolve<J: CookieJar>(
        &self,
        session: &mut Session,
        jar: &mut J,
    ) -> RequestContext {
        let token = self.codec.read(jar.get(&self.remember.cookie_name));

        let resolution =
            resolve(session.current_user(), &token, &self.lookup).await;
        let outcome = resolution.outcome;
        let (ctx, effect) = resolution.apply(session);

        if effect == TokenEffect::Clear {
            jar.remove(&self.remember.cookie_name);
            tracing::debug!(
                cookie = %self.remember.cookie_name,
                "remember-me cookie cleared"
            );
        }

        tracing::trace!(?outcome, "identity resolved");
        ctx
    }

    /// Runs the gate against an already-resolved context.
    pub fn require(&self, ctx: &RequestContext, original_path: &str) -> Access {
        self.gate.require(ctx, original_path)
    }

    /// Runs the full pipeline for one request.
    ///
    /// Identity is always resolved; the gate only runs on
    /// [`RouteAccess::Protected`] routes. Public routes are always
    /// allowed.
    pub async fn handle<J: CookieJar>(
        &self,
        session: &mut Session,
        jar: &mut J,
        route: RouteAccess,
        original_path: &str,
    ) -> (RequestContext, Access) {
        let ctx = self.resolve(session, jar).await;
        let access = match route {
            RouteAccess::Public => Access::Allow,
            RouteAccess::Protected => self.require(&ctx, original_path),
        };
        (ctx, access)
    }

    /// Encodes the remember-me cookie for `user`, for the login flow to
    /// set when the visitor ticks "remember me".
    ///
    /// Returns the cookie name and value.
    ///
    /// # Errors
    /// Returns [`WardenError::Protocol`] if the codec can't encode the
    /// token.
    pub fn remember_cookie(
        &self,
        user: &User,
    ) -> Result<(String, String), WardenError> {
        let value = self.codec.encode(&RememberToken::for_user(user))?;
        Ok((self.remember.cookie_name.clone(), value))
    }
}

impl<L: UserLookup, C: TokenCodec> std::fmt::Debug for Warden<L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("gate", &self.gate)
            .field("remember", &self.remember)
            .finish_non_exhaustive()
    }
}
