//! Session shell configuration: API endpoint, cookie names, encryption key and
//! request timeout. Callers start from [`AppSettings::new`] and apply overrides;
//! blank override values are ignored so an empty environment variable never
//! clears a default.

use crate::errors::AuthError;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Cookie key holding the serialized token info.
pub const DEFAULT_CREDENTIALS_KEY: &str = "credentials";
/// Cookie key holding the encrypted remember-me blob.
pub const DEFAULT_REMEMBER_KEY: &str = "remember";
/// Default request timeout (milliseconds) for backend calls.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct AppSettings {
    pub api_base_url: String,
    pub credentials_key: String,
    pub remember_key: String,
    pub encryption_key: SecretString,
    pub timeout_ms: u64,
    pub clear_all_cookies_on_login: bool,
}

impl AppSettings {
    #[must_use]
    pub fn new(api_base_url: impl Into<String>, encryption_key: SecretString) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            credentials_key: DEFAULT_CREDENTIALS_KEY.to_string(),
            remember_key: DEFAULT_REMEMBER_KEY.to_string(),
            encryption_key,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            clear_all_cookies_on_login: false,
        }
    }

    #[must_use]
    pub fn with_credentials_key(mut self, key: &str) -> Self {
        if let Some(value) = normalize_value(key) {
            self.credentials_key = value;
        }
        self
    }

    #[must_use]
    pub fn with_remember_key(mut self, key: &str) -> Self {
        if let Some(value) = normalize_value(key) {
            self.remember_key = value;
        }
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        if timeout_ms > 0 {
            self.timeout_ms = timeout_ms;
        }
        self
    }

    /// Wipe every cookie on login instead of only the keys owned by the session.
    #[must_use]
    pub fn with_clear_all_cookies_on_login(mut self, enabled: bool) -> Self {
        self.clear_all_cookies_on_login = enabled;
        self
    }

    /// Checks that the API base URL is absolute and that cookie keys and the
    /// encryption key are present.
    ///
    /// # Errors
    /// Returns [`AuthError::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), AuthError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(AuthError::Config("API base URL is not configured.".to_string()));
        }
        let url = Url::parse(base)
            .map_err(|err| AuthError::Config(format!("Invalid API base URL: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "Unsupported API URL scheme: {}",
                url.scheme()
            )));
        }
        if self.credentials_key.trim().is_empty() || self.remember_key.trim().is_empty() {
            return Err(AuthError::Config("Cookie keys must not be empty.".to_string()));
        }
        if self.credentials_key == self.remember_key {
            return Err(AuthError::Config(
                "Credentials and remember cookie keys must differ.".to_string(),
            ));
        }
        if self.encryption_key.expose_secret().trim().is_empty() {
            return Err(AuthError::Config("Encryption key is not configured.".to_string()));
        }
        Ok(())
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
