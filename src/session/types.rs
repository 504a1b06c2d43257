//! Records exchanged with the auth endpoints and kept in cookies. Token info and
//! credentials carry secrets: their `Debug` output is redacted and they must
//! never be logged.

use crate::fingerprint::BrowserInfo;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Username and password as typed by the user.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// Body of `auth/login`: the credentials merged with the browser fingerprint.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub session_id: &'a str,
    pub browser_id: &'a str,
    pub browser_name: &'a str,
    pub browser_version: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub(crate) fn new(credentials: &'a Credentials, browser: &'a BrowserInfo) -> Self {
        Self {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
            session_id: &browser.session_id,
            browser_id: &browser.browser_id,
            browser_name: &browser.browser_name,
            browser_version: &browser.browser_version,
        }
    }
}

/// Short-lived code returned by `auth/login`; consumed at once, never stored.
#[derive(Clone, Deserialize)]
pub struct AuthorizationCode {
    pub authorization_code: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize)]
pub(crate) struct TokenExchangeRequest<'a> {
    pub authorization_code: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a Value,
}

/// The canonical session record. Server fields are kept as the server sent
/// them, whatever their JSON type; only `enc_username` is produced here.
/// Fields this crate does not know about are kept in `extra`.
///
/// A field sent as `null` is present: it reads as `Some(Value::Null)` and
/// overwrites on merge, while an absent field reads as `None`.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc_username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TokenInfo {
    /// Access token when it is a string.
    #[must_use]
    pub fn access_token_str(&self) -> Option<&str> {
        self.access_token.as_ref().and_then(Value::as_str)
    }

    #[must_use]
    pub fn refresh_token_str(&self) -> Option<&str> {
        self.refresh_token.as_ref().and_then(Value::as_str)
    }

    /// User type as text: strings as is, numbers and booleans in their JSON
    /// form, anything else `None`.
    #[must_use]
    pub fn user_type_text(&self) -> Option<String> {
        match self.user_type.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Shallow merge: fields present in `update` win, `null` included; absent
    /// ones keep their current value.
    pub fn merge(&mut self, update: TokenInfo) {
        let TokenInfo {
            access_token,
            refresh_token,
            user_type,
            enc_username,
            extra,
        } = update;

        if access_token.is_some() {
            self.access_token = access_token;
        }
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        if user_type.is_some() {
            self.user_type = user_type;
        }
        if enc_username.is_some() {
            self.enc_username = enc_username;
        }
        self.extra.extend(extra);
    }

    #[must_use]
    pub fn merged(mut self, update: TokenInfo) -> Self {
        self.merge(update);
        self
    }
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |present: bool| present.then_some("[REDACTED]");
        f.debug_struct("TokenInfo")
            .field("access_token", &redact(self.access_token.is_some()))
            .field("refresh_token", &redact(self.refresh_token.is_some()))
            .field("user_type", &self.user_type)
            .field("enc_username", &redact(self.enc_username.is_some()))
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Credentials remembered for auto-fill, stored only in encrypted form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberMe {
    pub username: String,
    pub password: String,
}

impl RememberMe {
    pub(crate) fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.expose_secret().to_string(),
        }
    }
}

impl fmt::Debug for RememberMe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RememberMe")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
