//! Gate configuration.

use serde::{Deserialize, Serialize};

use crate::GateError;

/// Where anonymous visitors are sent, and how the original destination
/// travels with them.
///
/// Sensible defaults are provided; override only the fields you care
/// about:
///
/// ```rust
/// use warden_gate::GateConfig;
///
/// let config = GateConfig {
///     login_path: "/signin".into(),
///     ..GateConfig::default()
/// };
/// assert_eq!(config.redirect_param, "redirect");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// The login entry point. Must be an absolute path (start with `/`).
    ///
    /// Default: `/account/login`.
    pub login_path: String,

    /// Name of the query parameter that carries the original path.
    ///
    /// Default: `redirect`.
    pub redirect_param: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: "/account/login".to_string(),
            redirect_param: "redirect".to_string(),
        }
    }
}

impl GateConfig {
    /// Checks that the config can produce valid redirect targets.
    ///
    /// # Errors
    /// Returns [`GateError::InvalidConfig`] if the login path is not an
    /// absolute path, contains a fragment, or the parameter name is empty
    /// or contains reserved characters.
    pub fn validate(&self) -> Result<(), GateError> {
        if !self.login_path.starts_with('/') {
            return Err(GateError::InvalidConfig(format!(
                "login path must start with '/', got {:?}",
                self.login_path
            )));
        }
        if self.login_path.starts_with("//") {
            return Err(GateError::InvalidConfig(
                "login path must not be protocol-relative".into(),
            ));
        }
        if self.login_path.contains('#') {
            return Err(GateError::InvalidConfig(
                "login path must not contain a fragment".into(),
            ));
        }
        if self.redirect_param.is_empty() {
            return Err(GateError::InvalidConfig(
                "redirect parameter name must not be empty".into(),
            ));
        }
        if self
            .redirect_param
            .chars()
            .any(|c| matches!(c, '&' | '=' | '?' | '#') || c.is_whitespace())
        {
            return Err(GateError::InvalidConfig(format!(
                "redirect parameter name contains reserved characters: {:?}",
                self.redirect_param
            )));
        }
        Ok(())
    }
}
