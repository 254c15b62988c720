//! Identity vocabulary for Warden.
//!
//! This crate defines the values that every other Warden crate passes
//! around:
//!
//! - **Types** ([`UserId`], [`User`], [`CredentialSecret`],
//!   [`RememberToken`], [`TokenState`]): who a visitor claims to be and
//!   what they hold.
//! - **Codec** ([`TokenCodec`] trait, [`JsonCookieCodec`]): how a
//!   remember-me token is turned into a cookie value and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits below identity resolution. It never looks up
//! users and never touches sessions; it only knows how to read and write
//! the visitor-held credential.
//!
//! ```text
//! Cookie (string) → Protocol (TokenState) → Session (RequestContext) → Gate
//! ```

mod codec;
mod error;
mod types;

pub use codec::TokenCodec;
#[cfg(feature = "json")]
pub use codec::JsonCookieCodec;
pub use error::ProtocolError;
pub use types::{CredentialSecret, RememberToken, TokenState, User, UserId};
