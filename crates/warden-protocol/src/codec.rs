//! Codecs that move a [`RememberToken`] in and out of a cookie value.
//!
//! The resolver doesn't care how the token is stored on the client; it
//! only sees a [`TokenState`]. A codec is the piece that knows the cookie
//! format, so a deployment with a different format (signed, encrypted,
//! base64) swaps the codec and nothing else.

use crate::{ProtocolError, RememberToken, TokenState};

/// Converts between raw cookie values and remember-me tokens.
///
/// ## Trait bounds
///
/// `Send + Sync + 'static`, same as every other collaborator the
/// pipeline holds: one codec instance is shared by all concurrent
/// requests.
pub trait TokenCodec: Send + Sync + 'static {
    /// Serializes a token into a cookie value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode(&self, token: &RememberToken) -> Result<String, ProtocolError>;

    /// Parses a cookie value into a [`TokenState`].
    ///
    /// A value that parses but is missing a field is not an error here;
    /// it comes back as [`TokenState::Malformed`].
    ///
    /// # Errors
    /// Returns [`ProtocolError`] when the value can't be decoded at all.
    fn decode(&self, raw: &str) -> Result<TokenState, ProtocolError>;

    /// Reads an optional cookie value, folding decode errors into
    /// [`TokenState::Malformed`].
    ///
    /// This is what the pipeline calls. A cookie that is there but
    /// unreadable still has to be cleared, so it must not look like
    /// [`TokenState::Absent`]. An empty or blank value carries no fields
    /// at all and reads as absent.
    fn read(&self, raw: Option<&str>) -> TokenState {
        match raw {
            None => TokenState::Absent,
            Some(value) if value.trim().is_empty() => TokenState::Absent,
            Some(value) => self
                .decode(value)
                .unwrap_or_else(|e| TokenState::Malformed(e.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// JsonCookieCodec
// ---------------------------------------------------------------------------

/// A [`TokenCodec`] for JSON cookies in the `j:{...}` convention.
///
/// Web frameworks that support "JSON cookies" write an object as the
/// string `j:` followed by its JSON, then percent-encode the lot. The
/// remember-me object has two fields:
///
/// ```text
/// j:{"uid":"u1","pwd":"<hashed secret>"}
/// ```
///
/// Decoding is lenient about what it accepts, so cookies written by older
/// login code keep working:
///
/// - the `j:` prefix is optional;
/// - percent-encoding is optional;
/// - `secret` is accepted in place of `pwd`;
/// - an integer `uid` is accepted and read as its decimal string.
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use warden_protocol::{
///     CredentialSecret, JsonCookieCodec, RememberToken, TokenCodec, TokenState,
/// };
///
/// let codec = JsonCookieCodec;
/// let token = RememberToken::new("u1", CredentialSecret::new("h(p1)"));
///
/// let cookie = codec.encode(&token).unwrap();
/// assert_eq!(codec.read(Some(cookie.as_str())), TokenState::Present(token));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCookieCodec;

#[cfg(feature = "json")]
const JSON_COOKIE_PREFIX: &str = "j:";

/// Wire shape written by [`JsonCookieCodec::encode`].
#[cfg(feature = "json")]
#[derive(serde::Serialize)]
struct WireToken<'a> {
    uid: &'a str,
    pwd: &'a str,
}

/// Lenient wire shape read by [`JsonCookieCodec::decode`].
///
/// Both fields are optional so that "neither field" can be told apart
/// from "one field" after parsing.
#[cfg(feature = "json")]
#[derive(serde::Deserialize)]
struct RawToken {
    #[serde(default)]
    uid: Option<serde_json::Value>,
    #[serde(default, alias = "secret")]
    pwd: Option<serde_json::Value>,
}

#[cfg(feature = "json")]
impl TokenCodec for JsonCookieCodec {
    fn encode(&self, token: &RememberToken) -> Result<String, ProtocolError> {
        let wire = WireToken {
            uid: token.uid.as_str(),
            pwd: token.secret.expose(),
        };
        let json = serde_json::to_string(&wire).map_err(ProtocolError::Encode)?;
        let value = format!("{JSON_COOKIE_PREFIX}{json}");
        Ok(urlencoding::encode(&value).into_owned())
    }

    fn decode(&self, raw: &str) -> Result<TokenState, ProtocolError> {
        let decoded = urlencoding::decode(raw).map_err(|e| {
            ProtocolError::InvalidToken(format!("bad percent-encoding: {e}"))
        })?;
        let text: &str = decoded.as_ref();
        let json = text.strip_prefix(JSON_COOKIE_PREFIX).unwrap_or(text);

        let token: RawToken =
            serde_json::from_str(json).map_err(ProtocolError::Decode)?;

        let uid = field_to_string("uid", token.uid)?;
        let pwd = field_to_string("pwd", token.pwd)?;
        Ok(TokenState::from_fields(uid, pwd))
    }
}

/// Reads a JSON field as a string. `null` counts as missing; numbers must
/// be integers.
#[cfg(feature = "json")]
fn field_to_string(
    name: &str,
    value: Option<serde_json::Value>,
) -> Result<Option<String>, ProtocolError> {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => match (n.as_u64(), n.as_i64()) {
            (Some(v), _) => Ok(Some(v.to_string())),
            (None, Some(v)) => Ok(Some(v.to_string())),
            (None, None) => Err(ProtocolError::InvalidToken(format!(
                "{name} must be an integer, got {n}"
            ))),
        },
        Some(other) => Err(ProtocolError::InvalidToken(format!(
            "{name} must be a string or number, got {other}"
        ))),
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::CredentialSecret;

    fn token(uid: &str, secret: &str) -> RememberToken {
        RememberToken::new(uid, CredentialSecret::new(secret))
    }

    // =====================================================================
    // encode()
    // =====================================================================

    #[test]
    fn test_encode_produces_percent_encoded_json_cookie() {
        let cookie = JsonCookieCodec.encode(&token("u1", "h")).unwrap();
        assert_eq!(
            cookie,
            "j%3A%7B%22uid%22%3A%22u1%22%2C%22pwd%22%3A%22h%22%7D"
        );
    }

    // =====================================================================
    // decode()
    // =====================================================================

    #[test]
    fn test_decode_plain_json_without_prefix() {
        let state = JsonCookieCodec
            .decode(r#"{"uid":"u1","pwd":"h(p1)"}"#)
            .unwrap();
        assert_eq!(state, TokenState::Present(token("u1", "h(p1)")));
    }

    #[test]
    fn test_decode_unencoded_prefixed_json() {
        let state = JsonCookieCodec
            .decode(r#"j:{"uid":"u1","pwd":"h(p1)"}"#)
            .unwrap();
        assert_eq!(state, TokenState::Present(token("u1", "h(p1)")));
    }

    #[test]
    fn test_decode_accepts_secret_alias() {
        let state = JsonCookieCodec
            .decode(r#"{"uid":"u1","secret":"h(p1)"}"#)
            .unwrap();
        assert_eq!(state, TokenState::Present(token("u1", "h(p1)")));
    }

    #[test]
    fn test_decode_numeric_uid_read_as_string() {
        let state = JsonCookieCodec.decode(r#"{"uid":42,"pwd":"h"}"#).unwrap();
        assert_eq!(state, TokenState::Present(token("42", "h")));
    }

    #[test]
    fn test_decode_float_uid_returns_invalid_token() {
        for raw in [r#"{"uid":1e3,"pwd":"h"}"#, r#"{"uid":4.5,"pwd":"h"}"#] {
            let result = JsonCookieCodec.decode(raw);
            assert!(
                matches!(result, Err(ProtocolError::InvalidToken(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_decode_negative_integer_uid_read_as_string() {
        let state = JsonCookieCodec.decode(r#"{"uid":-7,"pwd":"h"}"#).unwrap();
        assert_eq!(state, TokenState::Present(token("-7", "h")));
    }

    #[test]
    fn test_decode_empty_object_is_absent() {
        let state = JsonCookieCodec.decode("j:{}").unwrap();
        assert_eq!(state, TokenState::Absent);
    }

    #[test]
    fn test_decode_null_fields_are_absent() {
        let state = JsonCookieCodec
            .decode(r#"{"uid":null,"pwd":null}"#)
            .unwrap();
        assert_eq!(state, TokenState::Absent);
    }

    #[test]
    fn test_decode_missing_secret_is_malformed() {
        let state = JsonCookieCodec.decode(r#"{"uid":"u1"}"#).unwrap();
        assert!(matches!(state, TokenState::Malformed(_)));
    }

    #[test]
    fn test_decode_non_json_returns_decode_error() {
        let result = JsonCookieCodec.decode("not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_object_uid_returns_invalid_token() {
        let result = JsonCookieCodec.decode(r#"{"uid":{"a":1},"pwd":"h"}"#);
        assert!(matches!(result, Err(ProtocolError::InvalidToken(_))));
    }

    #[test]
    fn test_decode_invalid_utf8_escape_returns_invalid_token() {
        let result = JsonCookieCodec.decode("%FF%FE");
        assert!(matches!(result, Err(ProtocolError::InvalidToken(_))));
    }

    // =====================================================================
    // read()
    // =====================================================================

    #[test]
    fn test_read_none_is_absent() {
        assert_eq!(JsonCookieCodec.read(None), TokenState::Absent);
    }

    #[test]
    fn test_read_empty_or_blank_value_is_absent() {
        for raw in ["", "   "] {
            assert_eq!(JsonCookieCodec.read(Some(raw)), TokenState::Absent);
        }
    }

    #[test]
    fn test_read_wire_value_keeps_literal_percent_in_secret() {
        let original = token("u1", "a%41b");
        let cookie = JsonCookieCodec.encode(&original).unwrap();
        assert!(cookie.contains("a%2541b"));
        assert_eq!(
            JsonCookieCodec.read(Some(cookie.as_str())),
            TokenState::Present(original)
        );
    }

    #[test]
    fn test_read_garbage_is_malformed_not_absent() {
        let state = JsonCookieCodec.read(Some("garbage"));
        assert!(matches!(state, TokenState::Malformed(_)));
    }

    #[test]
    fn test_read_encoded_cookie_yields_token() {
        let original = token("u1", "h(p1)");
        let cookie = JsonCookieCodec.encode(&original).unwrap();
        assert_eq!(
            JsonCookieCodec.read(Some(cookie.as_str())),
            TokenState::Present(original)
        );
    }
}
