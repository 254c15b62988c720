//! # Warden
//!
//! Per-request identity resolution and login gating for web apps.
//!
//! Every request goes through two steps:
//!
//! 1. **Resolve**: find out who the visitor is, from their session or,
//!    failing that, from their "remember me" cookie. Never blocks.
//! 2. **Require**: on protected routes only, let logged-in visitors
//!    through and redirect everyone else to the login page, remembering
//!    where they wanted to go.
//!
//! Warden plugs into an existing HTTP stack. The app supplies the user
//! store ([`UserLookup`](prelude::UserLookup)), loads and saves the
//! [`Session`](prelude::Session), and exposes its cookies through
//! [`CookieJar`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warden::prelude::*;
//!
//! # async fn demo(users: std::collections::HashMap<UserId, User>) -> Result<(), WardenError> {
//! let warden = WardenBuilder::new()
//!     .login_path("/account/login")
//!     .build(users)?;
//!
//! let mut session = Session::new();
//! let mut cookies = std::collections::HashMap::<String, String>::new();
//!
//! let (ctx, access) = warden
//!     .handle(&mut session, &mut cookies, RouteAccess::Protected, "/dashboard")
//!     .await;
//! # let _ = (ctx, access);
//! # Ok(())
//! # }
//! ```

mod cookie;
mod error;
mod pipeline;

pub use cookie::CookieJar;
pub use error::WardenError;
pub use pipeline::{
    RememberConfig, RouteAccess, Warden, WardenBuilder, WardenConfig,
};

pub mod prelude {
    //! Everything an app needs to wire Warden into its request pipeline.

    pub use crate::{
        CookieJar, RememberConfig, RouteAccess, Warden, WardenBuilder,
        WardenConfig, WardenError,
    };
    pub use warden_gate::{Access, AccessGate, GateConfig, GateError};
    pub use warden_protocol::{
        CredentialSecret, JsonCookieCodec, ProtocolError, RememberToken,
        TokenCodec, TokenState, User, UserId,
    };
    pub use warden_session::{
        LookupError, Outcome, RequestContext, Session, UserLookup,
    };
}
