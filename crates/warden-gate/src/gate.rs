//! The access gate: allow, or send to the login page.

use warden_session::RequestContext;

use crate::{GateConfig, GateError};

/// Fallback destination when a requested return path is unusable.
const DEFAULT_RETURN_PATH: &str = "/";

/// The gate's decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The visitor is logged in; continue processing.
    Allow,

    /// The visitor is anonymous; respond with a redirect to this target.
    Redirect(String),
}

impl Access {
    /// Returns `true` for [`Access::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Redirect(target) => Some(target),
        }
    }
}

/// Enforces a login requirement on protected routes.
///
/// Stateless per call: the only thing it holds is its validated config,
/// so a single gate can be shared by every request.
#[derive(Debug, Clone)]
pub struct AccessGate {
    config: GateConfig,
}

impl AccessGate {
    /// Creates a gate after validating `config`.
    ///
    /// # Errors
    /// Returns [`GateError::InvalidConfig`] if the config is unusable.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The gate's configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Decides whether the request may proceed.
    ///
    /// `original_path` must be the path and query string exactly as the
    /// visitor requested it, captured before any internal rewriting.
    pub fn require(&self, ctx: &RequestContext, original_path: &str) -> Access {
        if let Some(user) = ctx.current_user() {
            tracing::trace!(user_id = %user.id, "access allowed");
            return Access::Allow;
        }

        let target = self.login_redirect(original_path);
        tracing::debug!(%original_path, %target, "login required, redirecting");
        Access::Redirect(target)
    }

    /// Builds `<login_path>?<redirect_param>=<encoded original_path>`.
    ///
    /// If the login path already carries a query string, the parameter
    /// is appended with `&` instead.
    pub fn login_redirect(&self, original_path: &str) -> String {
        let separator = if self.config.login_path.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}{}={}",
            self.config.login_path,
            separator,
            self.config.redirect_param,
            encode_path(original_path)
        )
    }

    /// Picks where the login flow should send the visitor afterwards.
    ///
    /// Only same-site absolute paths are honoured. Anything else (missing,
    /// a full URL, a protocol-relative `//host` path) falls back to `/`,
    /// so the redirect parameter can't be used to bounce visitors to
    /// another site.
    pub fn return_path<'a>(&self, requested: Option<&'a str>) -> &'a str {
        match requested {
            Some(path) if is_local_path(path) => path,
            _ => DEFAULT_RETURN_PATH,
        }
    }
}

/// Percent-encodes a path for use as a query value.
///
/// Every reserved character is encoded except `/`, which RFC 3986 allows
/// in a query and keeps the common case readable:
/// `/dashboard` stays `/dashboard`, `/orders?page=2` becomes
/// `/orders%3Fpage%3D2`.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}
