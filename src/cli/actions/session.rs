//! Session commands that run against the stored cookie jar.

use crate::api::Transport;
use crate::cli::globals::GlobalArgs;
use crate::session::AuthenticationService;
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if the cookie jar cannot be written.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    globals.service()?.logout()?;
    println!("Logged out");
    Ok(())
}

/// # Errors
/// Returns an error if the service cannot be built.
pub fn status(globals: &GlobalArgs) -> Result<()> {
    println!("{}", status_line(&globals.service()?));
    Ok(())
}

/// # Errors
/// Returns an error if the service cannot be built.
pub fn token(globals: &GlobalArgs) -> Result<()> {
    println!("{}", globals.service()?.get_token());
    Ok(())
}

/// # Errors
/// Returns an error if the stored session is corrupt.
pub async fn whoami(globals: &GlobalArgs) -> Result<()> {
    let service = globals.service()?;
    let info = service
        .get_user_info()
        .await
        .context("failed to read stored session")?;

    match info {
        Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
        None => println!("Not logged in"),
    }
    Ok(())
}

/// # Errors
/// Returns an error if there is no session to refresh or the exchange fails.
pub async fn refresh(globals: &GlobalArgs) -> Result<()> {
    let service = globals.service()?;
    service.refresh().await.context("token refresh failed")?;
    println!("{}", status_line(&service));
    Ok(())
}

/// # Errors
/// Returns an error if the remembered blob cannot be decrypted.
pub fn remembered(globals: &GlobalArgs) -> Result<()> {
    match globals.service()?.remembered_credentials()? {
        Some(record) => println!("{}", record.username),
        None => println!("Nothing remembered"),
    }
    Ok(())
}

pub(crate) fn status_line<T: Transport>(service: &AuthenticationService<T>) -> String {
    if !service.is_authenticated() {
        return "Not logged in".to_string();
    }
    match service.get_user_type().as_str() {
        "" => "Logged in".to_string(),
        user_type => format!("Logged in ({user_type})"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{logout, status_line};
    use crate::cli::globals::GlobalArgs;
    use crate::cookies::{CookieStore, ROOT_PATH};
    use crate::crypto::AesEncryptor;

    fn globals(dir: &std::path::Path) -> GlobalArgs {
        GlobalArgs::new(
            "https://api.portal.dev".to_string(),
            dir.to_path_buf(),
            AesEncryptor::generate_key(),
        )
    }

    #[test]
    fn status_reflects_stored_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let globals = globals(dir.path());
        assert_eq!(status_line(&globals.service().unwrap()), "Not logged in");

        let cookies = globals.cookie_store(ROOT_PATH);
        cookies.set("credentials", "{}", ROOT_PATH).unwrap();
        assert_eq!(status_line(&globals.service().unwrap()), "Logged in");

        cookies
            .set("credentials", "{\"user_type\":\"admin\"}", ROOT_PATH)
            .unwrap();
        assert_eq!(status_line(&globals.service().unwrap()), "Logged in (admin)");
    }

    #[test]
    fn logout_removes_stored_session() {
        let dir = tempfile::tempdir().unwrap();
        let globals = globals(dir.path());
        let cookies = globals.cookie_store(ROOT_PATH);
        cookies.set("credentials", "{}", ROOT_PATH).unwrap();

        logout(&globals).unwrap();

        assert_eq!(cookies.get("credentials").unwrap(), None);
        assert!(!globals.service().unwrap().is_authenticated());
    }
}
