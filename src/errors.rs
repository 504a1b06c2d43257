use thiserror::Error;

/// Failures surfaced by the session shell. Messages are safe to show to users:
/// they never carry passwords, tokens, or cookie contents.
#[derive(Clone, Debug, Error)]
pub enum AuthError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("Crypto error: {0}")]
    Crypto(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Stored session is corrupt: {0}")]
    CorruptSession(String),
    #[error("No active session")]
    NoSession,
    #[error("Session is missing field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::AuthError;

    #[test]
    fn http_error_display_includes_status() {
        let err = AuthError::Http {
            status: 401,
            message: "invalid credentials".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (401): invalid credentials");
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = AuthError::MissingField("refresh_token");
        assert_eq!(err.to_string(), "Session is missing field: refresh_token");
    }
}
