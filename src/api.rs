//! HTTP transport for the backend JSON API. Every auth endpoint answers with the
//! same envelope, `{"response": {"data": ...}}`, and the transport decodes it
//! once so callers only deal with typed payloads. Requests share one timeout
//! policy and HTTP failures are surfaced with sanitized bodies. The transport
//! attaches no credentials on its own and never logs request bodies.

use crate::{config::AppSettings, errors::AuthError, APP_USER_AGENT};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info_span, Instrument};

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;

/// Response envelope shared by all backend endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub response: ApiPayload<T>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiPayload<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn new(data: T) -> Self {
        Self {
            response: ApiPayload { data },
        }
    }

    #[must_use]
    pub fn into_data(self) -> T {
        self.response.data
    }
}

/// Backend calls used by the session service.
///
/// The default implementation is [`HttpTransport`]; tests and embedders can
/// provide their own.
pub trait Transport: Send + Sync {
    /// Posts `body` as JSON to `path` (relative to the API base URL) and decodes
    /// the response envelope.
    fn post<B, T>(
        &self,
        path: &str,
        body: &B,
    ) -> impl Future<Output = Result<ApiResponse<T>, AuthError>> + Send
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;
}

/// `reqwest` backed transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport for the configured base URL and timeout.
    ///
    /// # Errors
    /// Returns [`AuthError::Config`] if the HTTP client cannot be built.
    pub fn new(settings: &AppSettings) -> Result<Self, AuthError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(|err| AuthError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: settings.api_base_url.clone(),
        })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, AuthError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let url = build_url_with_base(&self.base_url, path);
        let payload = serde_json::to_vec(body)
            .map_err(|err| AuthError::Serialization(format!("Failed to encode request: {err}")))?;

        let span = info_span!("api.post", http.method = "POST", url = %url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!("{} responded with {}", path, response.status());

        handle_json_response(response).await
    }
}

/// Builds a URL from an explicit base URL and the provided path.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps transport errors into `AuthError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AuthError {
    if err.is_timeout() {
        AuthError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AuthError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON envelopes and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<ApiResponse<T>, AuthError> {
    if response.status().is_success() {
        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|err| AuthError::Parse(format!("Failed to decode response: {err}")))
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(AuthError::Http {
            status,
            message: sanitize_body(&body),
        })
    }
}

/// Trims and truncates HTTP error bodies for user-facing messages.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{build_url_with_base, sanitize_body, ApiResponse, HttpTransport, Transport};
    use crate::{config::AppSettings, errors::AuthError};
    use anyhow::Result;
    use secrecy::SecretString;
    use serde::Deserialize;
    use serde_json::json;
    use std::net::TcpListener;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Code {
        authorization_code: String,
    }

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn transport(uri: &str, timeout_ms: u64) -> HttpTransport {
        let settings = AppSettings::new(uri, SecretString::from("unused".to_string()))
            .with_timeout_ms(timeout_ms);
        HttpTransport::new(&settings).unwrap()
    }

    #[test]
    fn build_url_joins_base_and_path() {
        assert_eq!(
            build_url_with_base("https://api.portal.dev/", "/auth/login"),
            "https://api.portal.dev/auth/login"
        );
        assert_eq!(
            build_url_with_base("https://api.portal.dev/v1", "auth/login"),
            "https://api.portal.dev/v1/auth/login"
        );
        assert_eq!(build_url_with_base("  ", "auth/login"), "auth/login");
    }

    #[test]
    fn sanitize_body_truncates_and_defaults() {
        assert_eq!(sanitize_body("   "), "Request failed.");
        assert_eq!(sanitize_body("  denied \n"), "denied");
        let long = "x".repeat(500);
        assert_eq!(sanitize_body(&long).len(), 200);
    }

    #[test]
    fn envelope_exposes_data() {
        let envelope: ApiResponse<Code> = serde_json::from_value(json!({
            "response": { "data": { "authorization_code": "abc" } }
        }))
        .unwrap();
        assert_eq!(envelope.into_data().authorization_code, "abc");
    }

    #[tokio::test]
    async fn post_decodes_envelope() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({ "username": "a" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": { "data": { "authorization_code": "code-1" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server.uri(), 5_000);
        let envelope: ApiResponse<Code> = transport
            .post("auth/login", &json!({ "username": "a" }))
            .await?;
        assert_eq!(envelope.response.data.authorization_code, "code-1");
        Ok(())
    }

    #[tokio::test]
    async fn post_surfaces_http_errors() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_string("  invalid credentials  "))
            .mount(&server)
            .await;

        let transport = transport(&server.uri(), 5_000);
        let result: Result<ApiResponse<Code>, AuthError> =
            transport.post("auth/login", &json!({})).await;
        match result {
            Err(AuthError::Http { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid credentials");
            }
            other => panic!("expected HTTP error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn post_rejects_unexpected_body() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&server)
            .await;

        let transport = transport(&server.uri(), 5_000);
        let result: Result<ApiResponse<Code>, AuthError> =
            transport.post("auth/login", &json!({})).await;
        assert!(matches!(result, Err(AuthError::Parse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn post_times_out() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(1_000))
                    .set_body_json(json!({
                        "response": { "data": { "authorization_code": "late" } }
                    })),
            )
            .mount(&server)
            .await;

        let transport = transport(&server.uri(), 50);
        let result: Result<ApiResponse<Code>, AuthError> =
            transport.post("auth/login", &json!({})).await;
        assert!(matches!(result, Err(AuthError::Timeout(_))));
        Ok(())
    }

    #[tokio::test]
    async fn post_reports_unreachable_server() {
        let transport = transport("http://127.0.0.1:9", 1_000);
        let result: Result<ApiResponse<Code>, AuthError> =
            transport.post("auth/login", &json!({})).await;
        assert!(matches!(
            result,
            Err(AuthError::Network(_) | AuthError::Timeout(_))
        ));
    }
}
