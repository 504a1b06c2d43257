//! # Portal (admin session shell)
//!
//! `portal` is the client-side shell of the admin portal. It owns the login
//! flow against the backend, keeps the resulting session in a cookie store,
//! and decides which routes a visitor may enter.
//!
//! ## Login flow
//!
//! 1. **Login:** credentials plus the browser fingerprint are posted to
//!    `auth/login`, which answers with a short-lived authorization code.
//! 2. **Exchange:** the code is posted to `auth/generateToken`, which answers
//!    with the token info (access token, refresh token, user type).
//! 3. **Persist:** the token info, extended with an encrypted copy of the
//!    username, is written under the credentials cookie at `/` and mirrored to
//!    the backup store. When asked to, the credentials are also remembered as
//!    one encrypted blob under the remember cookie.
//! 4. **Refresh:** `auth/regenerateToken` trades the refresh token for new
//!    token fields which are merged over the stored record.
//!
//! Reads (`get_user`, `get_token`, `is_authenticated`) only look at the cookie
//! store. Nothing in this crate validates tokens; the API must enforce access.

pub mod api;
pub mod backup;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod cli;
pub mod config;
pub mod cookies;
pub mod crypto;
pub mod errors;
pub mod fingerprint;
pub mod guard;
pub mod routes;
pub mod session;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub use config::AppSettings;
pub use errors::AuthError;
pub use guard::{AuthGuard, Navigation};
pub use session::{AuthenticationService, Credentials, SessionContext, TokenInfo};

#[cfg(test)]
mod tests {
    use super::{APP_USER_AGENT, GIT_COMMIT_HASH};

    #[test]
    fn user_agent_names_the_client_build() {
        assert_eq!(
            APP_USER_AGENT,
            format!("portal/{}", env!("CARGO_PKG_VERSION"))
        );
    }

    #[test]
    fn commit_hash_is_hex_or_unknown() {
        assert!(
            GIT_COMMIT_HASH == "unknown" || GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit())
        );
    }
}
