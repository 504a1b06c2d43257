//! Authentication service and the session state it owns. Login runs the
//! code/token exchange and persists the token info in the cookie store; every
//! read comes back from the cookie store. This module handles passwords and
//! tokens and must never log them.

mod context;
mod service;
pub mod types;


pub use context::SessionContext;
pub use service::{
    AuthenticationService, GENERATE_TOKEN_PATH, LOGIN_PATH, REGENERATE_TOKEN_PATH,
};
pub use types::{AuthorizationCode, Credentials, RememberMe, TokenInfo};
