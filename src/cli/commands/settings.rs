use clap::{Arg, ArgAction, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STATE_DIR: &str = "state-dir";
pub const ARG_ENCRYPTION_KEY: &str = "encryption-key";
pub const ARG_CREDENTIALS_KEY: &str = "credentials-key";
pub const ARG_REMEMBER_KEY: &str = "remember-key";
pub const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub const ARG_CLEAR_ALL_COOKIES: &str = "clear-all-cookies";

pub const DEFAULT_STATE_DIR: &str = ".portal";

/// Connection and session storage settings shared by every session command.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the backend API, example: https://api.portal.dev/v1")
                .env("PORTAL_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STATE_DIR)
                .long("state-dir")
                .help("Directory holding the cookie jar, the backup blob and the browser id")
                .env("PORTAL_STATE_DIR")
                .default_value(DEFAULT_STATE_DIR)
                .global(true),
        )
        .arg(
            Arg::new(ARG_ENCRYPTION_KEY)
                .long("encryption-key")
                .help("Base64 encoded 32 byte key used to encrypt the username and remembered credentials")
                .long_help(
                    "Base64 encoded 32 byte key used to encrypt the username and remembered credentials. Generate one with `portal keygen`.",
                )
                .env("PORTAL_ENCRYPTION_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_CREDENTIALS_KEY)
                .long("credentials-key")
                .help("Cookie name holding the session")
                .env("PORTAL_CREDENTIALS_KEY")
                .default_value(crate::config::DEFAULT_CREDENTIALS_KEY)
                .global(true),
        )
        .arg(
            Arg::new(ARG_REMEMBER_KEY)
                .long("remember-key")
                .help("Cookie name holding the remembered credentials")
                .env("PORTAL_REMEMBER_KEY")
                .default_value(crate::config::DEFAULT_REMEMBER_KEY)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_MS)
                .long("timeout-ms")
                .help("HTTP request timeout in milliseconds")
                .env("PORTAL_TIMEOUT_MS")
                .default_value("10000")
                .value_parser(clap::value_parser!(u64))
                .global(true),
        )
        .arg(
            Arg::new(ARG_CLEAR_ALL_COOKIES)
                .long("clear-all-cookies")
                .help("Wipe every cookie on login instead of only the session cookies")
                .env("PORTAL_CLEAR_ALL_COOKIES")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}
