//! Session state for one browser (or one CLI state directory). The context owns
//! the cookie keys and both stores, so every reader and writer of the session
//! goes through the same object instead of reaching into a shared cookie
//! namespace.

use super::types::TokenInfo;
use crate::backup::BackupStore;
use crate::config::AppSettings;
use crate::cookies::{CookieStore, ROOT_PATH};
use crate::errors::AuthError;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct SessionContext {
    cookies: Arc<dyn CookieStore>,
    backup: Arc<dyn BackupStore>,
    credentials_key: String,
    remember_key: String,
}

impl SessionContext {
    #[must_use]
    pub fn new(
        cookies: Arc<dyn CookieStore>,
        backup: Arc<dyn BackupStore>,
        settings: &AppSettings,
    ) -> Self {
        Self {
            cookies,
            backup,
            credentials_key: settings.credentials_key.clone(),
            remember_key: settings.remember_key.clone(),
        }
    }

    #[must_use]
    pub fn credentials_key(&self) -> &str {
        &self.credentials_key
    }

    #[must_use]
    pub fn remember_key(&self) -> &str {
        &self.remember_key
    }

    #[must_use]
    pub fn cookies(&self) -> &Arc<dyn CookieStore> {
        &self.cookies
    }

    /// Raw primary cookie value; empty values count as absent.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the cookie store cannot be read.
    pub fn raw_session(&self) -> Result<Option<String>, AuthError> {
        Ok(self
            .cookies
            .get(&self.credentials_key)?
            .filter(|value| !value.is_empty()))
    }

    /// Reads and parses the stored token info. A present value is mirrored to
    /// the backup store before parsing.
    ///
    /// # Errors
    /// Returns [`AuthError::CorruptSession`] if the stored value is not valid
    /// token info, or [`AuthError::Storage`] if the cookie store fails.
    pub fn user(&self) -> Result<Option<TokenInfo>, AuthError> {
        let Some(raw) = self.raw_session()? else {
            return Ok(None);
        };
        self.mirror(&raw);
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| AuthError::CorruptSession(err.to_string()))
    }

    /// Presence check only; the token is not inspected.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        match self.raw_session() {
            Ok(session) => session.is_some(),
            Err(err) => {
                warn!("Failed to read session cookie: {}", err);
                false
            }
        }
    }

    /// Writes the token info under the primary key at `/` and mirrors it.
    ///
    /// # Errors
    /// Returns [`AuthError::Serialization`] or [`AuthError::Storage`].
    pub fn store(&self, info: &TokenInfo) -> Result<(), AuthError> {
        let blob = serde_json::to_string(info)
            .map_err(|err| AuthError::Serialization(format!("Failed to encode session: {err}")))?;
        self.cookies.set(&self.credentials_key, &blob, ROOT_PATH)?;
        self.mirror(&blob);
        Ok(())
    }

    /// Replaces whatever session exists with `info`, optionally remembering an
    /// already encrypted credentials blob.
    ///
    /// With `clear_all` every cookie is wiped first; otherwise only the keys
    /// owned by the session are removed.
    ///
    /// # Errors
    /// Returns [`AuthError::Serialization`] or [`AuthError::Storage`].
    pub fn establish(
        &self,
        info: &TokenInfo,
        remember_blob: Option<&str>,
        clear_all: bool,
    ) -> Result<(), AuthError> {
        if clear_all {
            self.cookies.delete_all()?;
        } else {
            self.clear_owned()?;
        }

        if let Some(blob) = remember_blob {
            self.cookies.set(&self.remember_key, blob, ROOT_PATH)?;
        }

        self.store(info)
    }

    /// Encrypted remember-me blob, if any.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the cookie store cannot be read.
    pub fn remembered_blob(&self) -> Result<Option<String>, AuthError> {
        Ok(self
            .cookies
            .get(&self.remember_key)?
            .filter(|value| !value.is_empty()))
    }

    /// Deletes the primary cookie at the default path and at `/`, since the
    /// path it was written with is not known for older sessions.
    /// The backup store keeps its last blob.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the cookie store cannot be written.
    pub fn clear_session(&self) -> Result<(), AuthError> {
        self.cookies.delete(&self.credentials_key, None)?;
        self.cookies.delete(&self.credentials_key, Some(ROOT_PATH))
    }

    fn clear_owned(&self) -> Result<(), AuthError> {
        for key in [&self.credentials_key, &self.remember_key] {
            self.cookies.delete(key, None)?;
            self.cookies.delete(key, Some(ROOT_PATH))?;
        }
        Ok(())
    }

    fn mirror(&self, blob: &str) {
        match self.backup.save_token_info(blob) {
            Ok(()) => debug!("session mirrored to backup store"),
            Err(err) => warn!("Failed to back up session: {}", err),
        }
    }
}
