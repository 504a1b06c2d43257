use super::context::SessionContext;
use super::types::{
    AuthorizationCode, Credentials, LoginRequest, RefreshRequest, RememberMe,
    TokenExchangeRequest, TokenInfo,
};
use crate::api::{ApiResponse, HttpTransport, Transport};
use crate::backup::BackupStore;
use crate::config::AppSettings;
use crate::cookies::CookieStore;
use crate::crypto::{decrypt_record, encrypt_record, encrypt_text, AesEncryptor, Encryptor};
use crate::errors::AuthError;
use crate::fingerprint::BrowserInfo;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const LOGIN_PATH: &str = "auth/login";
pub const GENERATE_TOKEN_PATH: &str = "auth/generateToken";
pub const REGENERATE_TOKEN_PATH: &str = "auth/regenerateToken";

/// Login, token issuance, refresh and logout on top of a [`SessionContext`].
pub struct AuthenticationService<T> {
    transport: T,
    session: SessionContext,
    encryptor: Arc<dyn Encryptor>,
    browser: BrowserInfo,
    clear_all_cookies_on_login: bool,
}

impl AuthenticationService<HttpTransport> {
    /// Wires the default HTTP transport and AES encryptor from settings.
    ///
    /// # Errors
    /// Returns [`AuthError::Config`] if the settings are invalid or the key
    /// cannot be loaded.
    pub fn from_settings(
        settings: &AppSettings,
        cookies: Arc<dyn CookieStore>,
        backup: Arc<dyn BackupStore>,
        browser: BrowserInfo,
    ) -> Result<Self, AuthError> {
        settings.validate()?;
        let transport = HttpTransport::new(settings)?;
        let encryptor = AesEncryptor::from_base64(&settings.encryption_key)?;
        let session = SessionContext::new(cookies, backup, settings);

        Ok(Self::new(transport, session, Arc::new(encryptor), browser)
            .with_clear_all_cookies_on_login(settings.clear_all_cookies_on_login))
    }
}

impl<T: Transport> AuthenticationService<T> {
    #[must_use]
    pub fn new(
        transport: T,
        session: SessionContext,
        encryptor: Arc<dyn Encryptor>,
        browser: BrowserInfo,
    ) -> Self {
        Self {
            transport,
            session,
            encryptor,
            browser,
            clear_all_cookies_on_login: false,
        }
    }

    #[must_use]
    pub fn with_clear_all_cookies_on_login(mut self, enabled: bool) -> Self {
        self.clear_all_cookies_on_login = enabled;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub fn browser(&self) -> &BrowserInfo {
        &self.browser
    }

    /// Logs in with the two-step code/token exchange and persists the session.
    ///
    /// Nothing is written unless both calls succeed and all encryption is done;
    /// after that the cookie writes happen without yielding.
    ///
    /// # Errors
    /// Returns the transport error of either call unchanged, or a crypto or
    /// storage error while persisting.
    #[instrument(skip(self, credentials))]
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
        remember_me: bool,
    ) -> Result<TokenInfo, AuthError> {
        let login = LoginRequest::new(credentials, &self.browser);
        let code: ApiResponse<AuthorizationCode> = self.transport.post(LOGIN_PATH, &login).await?;
        let code = code.into_data();
        debug!("authorization code received");

        let exchange = TokenExchangeRequest {
            authorization_code: &code.authorization_code,
        };
        let token: ApiResponse<TokenInfo> =
            self.transport.post(GENERATE_TOKEN_PATH, &exchange).await?;

        let mut info = token.into_data();
        info.enc_username = Some(encrypt_text(self.encryptor.as_ref(), &credentials.username)?);

        let remember_blob = if remember_me {
            let record = RememberMe::from_credentials(credentials);
            Some(encrypt_record(self.encryptor.as_ref(), &record)?)
        } else {
            None
        };

        self.session.establish(
            &info,
            remember_blob.as_deref(),
            self.clear_all_cookies_on_login,
        )?;

        info!(
            user_type = info.user_type_text().unwrap_or_default(),
            "login succeeded"
        );

        Ok(info)
    }

    /// Current token info, or `None` without a session.
    ///
    /// # Errors
    /// Returns [`AuthError::CorruptSession`] if the stored value cannot be
    /// parsed, or [`AuthError::Storage`].
    pub fn get_user(&self) -> Result<Option<TokenInfo>, AuthError> {
        self.session.user()
    }

    /// Async form of [`Self::get_user`] for callers composing futures.
    ///
    /// # Errors
    /// Same as [`Self::get_user`].
    pub async fn get_user_info(&self) -> Result<Option<TokenInfo>, AuthError> {
        self.get_user()
    }

    /// Access token, or an empty string when absent or not a string.
    #[must_use]
    pub fn get_token(&self) -> String {
        self.readable_user()
            .and_then(|info| info.access_token_str().map(ToString::to_string))
            .unwrap_or_default()
    }

    /// User type as text (see [`TokenInfo::user_type_text`]), or an empty
    /// string.
    #[must_use]
    pub fn get_user_type(&self) -> String {
        self.readable_user()
            .and_then(|info| info.user_type_text())
            .unwrap_or_default()
    }

    /// Removes the session cookie. The backup store is left as is.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the cookie store cannot be written.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.clear_session()?;
        info!("logged out");
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Trades the stored refresh token for new token fields and returns the
    /// raw response; feed its data to [`Self::update_refreshed_token`].
    ///
    /// # Errors
    /// Returns [`AuthError::NoSession`] without a session,
    /// [`AuthError::MissingField`] without a refresh token, or the transport
    /// error unchanged.
    #[instrument(skip_all)]
    pub async fn get_refresh_token(&self) -> Result<ApiResponse<TokenInfo>, AuthError> {
        let info = self.get_user()?.ok_or(AuthError::NoSession)?;
        let refresh_token = info
            .refresh_token
            .as_ref()
            .filter(|token| !token.is_null())
            .ok_or(AuthError::MissingField("refresh_token"))?;

        self.transport
            .post(REGENERATE_TOKEN_PATH, &RefreshRequest { refresh_token })
            .await
    }

    /// Merges refreshed fields over the stored token info and persists it.
    ///
    /// # Errors
    /// Returns [`AuthError::CorruptSession`], [`AuthError::Serialization`] or
    /// [`AuthError::Storage`].
    pub fn update_refreshed_token(&self, update: TokenInfo) -> Result<TokenInfo, AuthError> {
        let merged = self.get_user()?.unwrap_or_default().merged(update);
        self.session.store(&merged)?;
        debug!("refreshed tokens stored");
        Ok(merged)
    }

    /// [`Self::get_refresh_token`] followed by [`Self::update_refreshed_token`].
    ///
    /// # Errors
    /// Any error of the two steps.
    pub async fn refresh(&self) -> Result<TokenInfo, AuthError> {
        let response = self.get_refresh_token().await?;
        self.update_refreshed_token(response.into_data())
    }

    /// Decrypts the remember-me cookie for auto-fill.
    ///
    /// # Errors
    /// Returns [`AuthError::Crypto`] or [`AuthError::Parse`] if the blob
    /// cannot be opened, or [`AuthError::Storage`].
    pub fn remembered_credentials(&self) -> Result<Option<RememberMe>, AuthError> {
        self.session
            .remembered_blob()?
            .map(|blob| decrypt_record(self.encryptor.as_ref(), &blob))
            .transpose()
    }

    fn readable_user(&self) -> Option<TokenInfo> {
        match self.get_user() {
            Ok(info) => info,
            Err(err) => {
                warn!("Ignoring unreadable session: {}", err);
                None
            }
        }
    }
}
