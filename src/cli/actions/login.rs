use crate::api::Transport;
use crate::cli::globals::GlobalArgs;
use crate::session::{AuthenticationService, Credentials};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: String,
    pub password: Option<SecretString>,
    pub remember_me: bool,
}

/// Execute the login action.
/// # Errors
/// Returns an error if no password is available or the login fails.
pub async fn execute(args: Args) -> Result<()> {
    let service = args.globals.service()?;
    let credentials = credentials(&service, &args.username, args.password)?;

    let info = service
        .authenticate(&credentials, args.remember_me)
        .await
        .context("login failed")?;

    println!(
        "Logged in as {} ({})",
        credentials.username,
        info.user_type_text().as_deref().unwrap_or("unknown")
    );

    Ok(())
}

/// Uses the given password, or the remembered one when it belongs to the same
/// username.
pub(crate) fn credentials<T: Transport>(
    service: &AuthenticationService<T>,
    username: &str,
    password: Option<SecretString>,
) -> Result<Credentials> {
    if let Some(password) = password {
        return Ok(Credentials::new(username, password));
    }

    match service.remembered_credentials()? {
        Some(remembered) if remembered.username == username => {
            debug!("using remembered password");
            Ok(Credentials::new(username, SecretString::from(remembered.password)))
        }
        _ => Err(anyhow!(
            "missing required argument: --password (nothing remembered for {username})"
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::credentials;
    use crate::api::HttpTransport;
    use crate::backup::MemoryBackupStore;
    use crate::config::AppSettings;
    use crate::cookies::{CookieStore, MemoryCookieStore, ROOT_PATH};
    use crate::crypto::{encrypt_record, AesEncryptor};
    use crate::fingerprint::BrowserInfo;
    use crate::session::{AuthenticationService, RememberMe, SessionContext};
    use secrecy::{ExposeSecret, SecretString};
    use std::sync::Arc;

    const KEY: [u8; 32] = [7u8; 32];

    fn service(cookies: Arc<MemoryCookieStore>) -> AuthenticationService<HttpTransport> {
        let settings = AppSettings::new("http://127.0.0.1:9", SecretString::default());
        let session = SessionContext::new(cookies, Arc::new(MemoryBackupStore::new()), &settings);
        AuthenticationService::new(
            HttpTransport::new(&settings).unwrap(),
            session,
            Arc::new(AesEncryptor::from_bytes(KEY)),
            BrowserInfo::detect(None),
        )
    }

    fn remembered(username: &str) -> Arc<MemoryCookieStore> {
        let record = RememberMe {
            username: username.to_string(),
            password: "remembered".to_string(),
        };
        let blob = encrypt_record(&AesEncryptor::from_bytes(KEY), &record).unwrap();
        let cookies = Arc::new(MemoryCookieStore::new());
        cookies.set("remember", &blob, ROOT_PATH).unwrap();
        cookies
    }

    #[test]
    fn explicit_password_wins() {
        let svc = service(remembered("alice"));
        let creds =
            credentials(&svc, "alice", Some(SecretString::from("typed".to_string()))).unwrap();
        assert_eq!(creds.password.expose_secret(), "typed");
    }

    #[test]
    fn falls_back_to_remembered_password() {
        let svc = service(remembered("alice"));
        let creds = credentials(&svc, "alice", None).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password.expose_secret(), "remembered");
    }

    #[test]
    fn remembered_password_of_other_user_is_ignored() {
        let svc = service(remembered("bob"));
        assert!(credentials(&svc, "alice", None).is_err());
    }

    #[test]
    fn missing_password_without_memory_fails() {
        let svc = service(Arc::new(MemoryCookieStore::new()));
        assert!(credentials(&svc, "alice", None).is_err());
    }

    #[test]
    fn unreadable_remembered_blob_fails() {
        let cookies = Arc::new(MemoryCookieStore::new());
        cookies.set("remember", "not-a-blob", ROOT_PATH).unwrap();
        let svc = service(cookies);
        assert!(credentials(&svc, "alice", None).is_err());
    }
}
