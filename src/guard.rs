//! Route guard for the admin area. The check only looks at session presence;
//! it is a UX gate and real access control must live on the API.

use crate::api::Transport;
use crate::cookies::ROOT_PATH;
use crate::session::{AuthenticationService, SessionContext};
use std::sync::Arc;
use tracing::debug;

/// Anything that can answer whether a session is present.
pub trait SessionStatus {
    fn is_authenticated(&self) -> bool;
}

impl SessionStatus for SessionContext {
    fn is_authenticated(&self) -> bool {
        SessionContext::is_authenticated(self)
    }
}

impl<T: Transport> SessionStatus for AuthenticationService<T> {
    fn is_authenticated(&self) -> bool {
        AuthenticationService::is_authenticated(self)
    }
}

impl<S: SessionStatus + ?Sized> SessionStatus for &S {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

impl<S: SessionStatus + ?Sized> SessionStatus for Arc<S> {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

/// Outcome of a guard check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    /// Navigation denied; go here instead.
    Redirect(String),
}

impl Navigation {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

pub struct AuthGuard<S> {
    session: S,
    redirect_to: String,
}

impl<S: SessionStatus> AuthGuard<S> {
    /// Guard redirecting anonymous visitors to the root route.
    #[must_use]
    pub fn new(session: S) -> Self {
        Self {
            session,
            redirect_to: ROOT_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_redirect(mut self, path: &str) -> Self {
        self.redirect_to = path.to_string();
        self
    }

    #[must_use]
    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    /// Synchronous check, evaluated at navigation time.
    #[must_use]
    pub fn check(&self) -> Navigation {
        if self.session.is_authenticated() {
            Navigation::Allow
        } else {
            debug!("no session, redirecting to {}", self.redirect_to);
            Navigation::Redirect(self.redirect_to.clone())
        }
    }

    #[must_use]
    pub fn can_activate(&self) -> bool {
        self.check().is_allowed()
    }
}
