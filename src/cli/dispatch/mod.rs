use crate::cli::actions::{login, navigate, Action};
use crate::cli::commands::{
    settings::{
        ARG_API_URL, ARG_CLEAR_ALL_COOKIES, ARG_CREDENTIALS_KEY, ARG_ENCRYPTION_KEY,
        ARG_REMEMBER_KEY, ARG_STATE_DIR, ARG_TIMEOUT_MS, DEFAULT_STATE_DIR,
    },
    ARG_PASSWORD, ARG_PATH, ARG_REMEMBER_ME, ARG_USERNAME, CMD_KEYGEN, CMD_LOGIN, CMD_LOGOUT,
    CMD_NAVIGATE, CMD_REFRESH, CMD_REMEMBERED, CMD_STATUS, CMD_TOKEN, CMD_WHOAMI,
};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .context("missing subcommand, see --help")?;

    let action = match name {
        CMD_LOGIN => Action::Login(login::Args {
            globals: globals(matches)?,
            username: sub_m
                .get_one::<String>(ARG_USERNAME)
                .cloned()
                .context("missing required argument: --username")?,
            password: sub_m
                .get_one::<String>(ARG_PASSWORD)
                .filter(|password| !password.is_empty())
                .map(|password| SecretString::from(password.clone())),
            remember_me: sub_m.get_flag(ARG_REMEMBER_ME),
        }),
        CMD_LOGOUT => Action::Logout(globals(matches)?),
        CMD_STATUS => Action::Status(globals(matches)?),
        CMD_TOKEN => Action::Token(globals(matches)?),
        CMD_WHOAMI => Action::Whoami(globals(matches)?),
        CMD_REFRESH => Action::Refresh(globals(matches)?),
        CMD_REMEMBERED => Action::Remembered(globals(matches)?),
        CMD_NAVIGATE => Action::Navigate(navigate::Args {
            globals: storage_globals(matches),
            path: sub_m
                .get_one::<String>(ARG_PATH)
                .cloned()
                .context("missing required argument: <path>")?,
        }),
        CMD_KEYGEN => Action::Keygen,
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}

/// Everything a session command needs, with the API URL and key mandatory.
fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let mut globals = storage_globals(matches);

    globals.api_url = matches
        .get_one::<String>(ARG_API_URL)
        .filter(|url| !url.trim().is_empty())
        .cloned()
        .context("missing required argument: --api-url")?;
    globals.encryption_key = matches
        .get_one::<String>(ARG_ENCRYPTION_KEY)
        .filter(|key| !key.trim().is_empty())
        .map(|key| SecretString::from(key.clone()))
        .context("missing required argument: --encryption-key")?;

    Ok(globals)
}

/// Cookie storage settings only; the guard needs nothing else.
fn storage_globals(matches: &clap::ArgMatches) -> GlobalArgs {
    let state_dir = matches
        .get_one::<String>(ARG_STATE_DIR)
        .map_or_else(|| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);

    let mut globals = GlobalArgs::new(String::new(), state_dir, SecretString::default());
    if let Some(key) = matches.get_one::<String>(ARG_CREDENTIALS_KEY) {
        globals.credentials_key.clone_from(key);
    }
    if let Some(key) = matches.get_one::<String>(ARG_REMEMBER_KEY) {
        globals.remember_key.clone_from(key);
    }
    if let Some(timeout_ms) = matches.get_one::<u64>(ARG_TIMEOUT_MS) {
        globals.timeout_ms = *timeout_ms;
    }
    globals.clear_all_cookies = matches.get_flag(ARG_CLEAR_ALL_COOKIES);
    globals
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::handler;
    use crate::cli::actions::Action;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    const ENV: [(&str, Option<&str>); 4] = [
        ("PORTAL_API_URL", None),
        ("PORTAL_ENCRYPTION_KEY", None),
        ("PORTAL_PASSWORD", None),
        ("PORTAL_STATE_DIR", None),
    ];

    fn dispatch(args: &[&str]) -> anyhow::Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn test_login_action() {
        temp_env::with_vars(ENV, || {
            let action = dispatch(&[
                "portal",
                "--api-url",
                "https://api.portal.dev",
                "--encryption-key",
                "a2V5",
                "--state-dir",
                "/tmp/portal",
                "login",
                "-u",
                "alice",
                "-p",
                "secret",
                "--remember-me",
            ])
            .unwrap();

            let Action::Login(args) = action else {
                panic!("expected login action");
            };
            assert_eq!(args.username, "alice");
            assert_eq!(
                args.password.as_ref().map(|p| p.expose_secret().to_string()),
                Some("secret".to_string())
            );
            assert!(args.remember_me);
            assert_eq!(args.globals.api_url, "https://api.portal.dev");
            assert_eq!(args.globals.state_dir.to_str(), Some("/tmp/portal"));
            assert_eq!(args.globals.encryption_key.expose_secret(), "a2V5");
        });
    }

    #[test]
    fn test_session_commands_require_api_url() {
        temp_env::with_vars(ENV, || {
            let err = dispatch(&["portal", "--encryption-key", "a2V5", "token"]).unwrap_err();
            assert!(err.to_string().contains("--api-url"));
        });
    }

    #[test]
    fn test_session_commands_require_encryption_key() {
        temp_env::with_vars(ENV, || {
            let err =
                dispatch(&["portal", "--api-url", "https://api.portal.dev", "status"]).unwrap_err();
            assert!(err.to_string().contains("--encryption-key"));
        });
    }

    #[test]
    fn test_navigate_and_keygen_need_no_connection() {
        temp_env::with_vars(ENV, || {
            let Action::Navigate(args) = dispatch(&["portal", "navigate", "/admin"]).unwrap()
            else {
                panic!("expected navigate action");
            };
            assert_eq!(args.path, "/admin");
            assert_eq!(args.globals.state_dir.to_str(), Some(".portal"));

            assert!(matches!(
                dispatch(&["portal", "keygen"]).unwrap(),
                Action::Keygen
            ));
        });
    }

    #[test]
    fn test_cookie_keys_from_env() {
        temp_env::with_vars(
            [
                ("PORTAL_API_URL", Some("https://api.portal.dev")),
                ("PORTAL_ENCRYPTION_KEY", Some("a2V5")),
                ("PORTAL_CREDENTIALS_KEY", Some("session")),
                ("PORTAL_REMEMBER_KEY", Some("saved")),
                ("PORTAL_CLEAR_ALL_COOKIES", None),
            ],
            || {
                let Action::Refresh(globals) = dispatch(&["portal", "refresh"]).unwrap() else {
                    panic!("expected refresh action");
                };
                assert_eq!(globals.credentials_key, "session");
                assert_eq!(globals.remember_key, "saved");
                assert!(!globals.clear_all_cookies);
            },
        );
    }
}
