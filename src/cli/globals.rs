use crate::api::HttpTransport;
use crate::backup::FileBackupStore;
use crate::config::AppSettings;
use crate::cookies::{write_private, CookieStore, FileCookieStore};
use crate::fingerprint::BrowserInfo;
use crate::session::{AuthenticationService, SessionContext};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const COOKIES_FILE: &str = "cookies.json";
const BACKUP_FILE: &str = "token-backup.json";
const BROWSER_ID_FILE: &str = "browser-id";

/// Settings shared by every session command.
#[derive(Clone)]
pub struct GlobalArgs {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub encryption_key: SecretString,
    pub credentials_key: String,
    pub remember_key: String,
    pub timeout_ms: u64,
    pub clear_all_cookies: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: String, state_dir: PathBuf, encryption_key: SecretString) -> Self {
        Self {
            api_url,
            state_dir,
            encryption_key,
            credentials_key: crate::config::DEFAULT_CREDENTIALS_KEY.to_string(),
            remember_key: crate::config::DEFAULT_REMEMBER_KEY.to_string(),
            timeout_ms: crate::config::DEFAULT_TIMEOUT_MS,
            clear_all_cookies: false,
        }
    }

    #[must_use]
    pub fn settings(&self) -> AppSettings {
        AppSettings::new(self.api_url.clone(), self.encryption_key.clone())
            .with_credentials_key(&self.credentials_key)
            .with_remember_key(&self.remember_key)
            .with_timeout_ms(self.timeout_ms)
            .with_clear_all_cookies_on_login(self.clear_all_cookies)
    }

    #[must_use]
    pub fn cookies_path(&self) -> PathBuf {
        self.state_dir.join(COOKIES_FILE)
    }

    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        self.state_dir.join(BACKUP_FILE)
    }

    /// Cookie jar on disk, seen from `document_path`.
    #[must_use]
    pub fn cookie_store(&self, document_path: &str) -> Arc<dyn CookieStore> {
        Arc::new(FileCookieStore::new(self.cookies_path()).with_document_path(document_path))
    }

    /// Session state without the network side; enough for guard checks.
    #[must_use]
    pub fn session_context(&self, document_path: &str) -> SessionContext {
        SessionContext::new(
            self.cookie_store(document_path),
            Arc::new(FileBackupStore::new(self.backup_path())),
            &self.settings(),
        )
    }

    /// Authentication service backed by the state directory.
    ///
    /// # Errors
    /// Returns an error if the state directory cannot be prepared or the
    /// settings are invalid.
    pub fn service(&self) -> Result<AuthenticationService<HttpTransport>> {
        fs::create_dir_all(&self.state_dir).with_context(|| {
            format!("failed to create state dir {}", self.state_dir.display())
        })?;

        let browser_id = load_browser_id(&self.state_dir)?;
        let browser = BrowserInfo::detect(Some(&browser_id));
        debug!("session id {}", browser.session_id);

        let settings = self.settings();
        let service = AuthenticationService::from_settings(
            &settings,
            self.cookie_store(crate::cookies::ROOT_PATH),
            Arc::new(FileBackupStore::new(self.backup_path())),
            browser,
        )?;

        Ok(service)
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("api_url", &self.api_url)
            .field("state_dir", &self.state_dir)
            .field("encryption_key", &"***")
            .field("credentials_key", &self.credentials_key)
            .field("remember_key", &self.remember_key)
            .field("timeout_ms", &self.timeout_ms)
            .field("clear_all_cookies", &self.clear_all_cookies)
            .finish()
    }
}

/// Stable browser id kept in the state dir, created on first use.
fn load_browser_id(state_dir: &Path) -> Result<String> {
    let path = state_dir.join(BROWSER_ID_FILE);
    if let Ok(existing) = fs::read_to_string(&path) {
        let existing = existing.trim();
        if !existing.is_empty() {
            return Ok(existing.to_string());
        }
    }

    let id = BrowserInfo::detect(None).browser_id;
    write_private(&path, id.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(id)
}
