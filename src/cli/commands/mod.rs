pub mod logging;
pub mod settings;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";
pub const CMD_TOKEN: &str = "token";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_REFRESH: &str = "refresh";
pub const CMD_REMEMBERED: &str = "remembered";
pub const CMD_NAVIGATE: &str = "navigate";
pub const CMD_KEYGEN: &str = "keygen";

pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_REMEMBER_ME: &str = "remember-me";
pub const ARG_PATH: &str = "path";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("portal")
        .about("Admin portal session shell")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommands(subcommands());

    let command = settings::with_args(command);
    logging::with_args(command)
}

fn subcommands() -> [Command; 9] {
    [
        Command::new(CMD_LOGIN)
            .about("Log in and store the session")
            .arg(
                Arg::new(ARG_USERNAME)
                    .short('u')
                    .long("username")
                    .help("Account username")
                    .env("PORTAL_USERNAME")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_PASSWORD)
                    .short('p')
                    .long("password")
                    .help("Account password; falls back to the remembered one for the same username")
                    .env("PORTAL_PASSWORD")
                    .hide_env_values(true),
            )
            .arg(
                Arg::new(ARG_REMEMBER_ME)
                    .long("remember-me")
                    .help("Remember the credentials (encrypted) for the next login")
                    .action(ArgAction::SetTrue),
            ),
        Command::new(CMD_LOGOUT).about("Remove the stored session"),
        Command::new(CMD_STATUS).about("Show whether a session is stored and its user type"),
        Command::new(CMD_TOKEN).about("Print the access token, empty without a session"),
        Command::new(CMD_WHOAMI).about("Print the stored token info as JSON, secrets included"),
        Command::new(CMD_REFRESH).about("Trade the refresh token for new tokens and store them"),
        Command::new(CMD_REMEMBERED).about("Print the remembered username, if any"),
        Command::new(CMD_NAVIGATE)
            .about("Resolve a route through the auth guard")
            .arg(
                Arg::new(ARG_PATH)
                    .help("Route path, example: /admin/dashboard")
                    .required(true),
            ),
        Command::new(CMD_KEYGEN).about("Print a fresh base64 encryption key"),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use settings::{ARG_API_URL, ARG_CLEAR_ALL_COOKIES, ARG_STATE_DIR, ARG_TIMEOUT_MS};

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "portal");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Admin portal session shell".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_login_args() {
        temp_env::with_vars(
            [
                ("PORTAL_PASSWORD", None::<&str>),
                ("PORTAL_USERNAME", None),
                ("PORTAL_STATE_DIR", None),
                ("PORTAL_TIMEOUT_MS", None),
            ],
            || {
                let matches = new().get_matches_from(vec![
                    "portal",
                    "--api-url",
                    "https://api.portal.dev",
                    "login",
                    "--username",
                    "alice",
                    "--password",
                    "secret",
                    "--remember-me",
                ]);

                assert_eq!(
                    matches.get_one::<String>(ARG_API_URL).cloned(),
                    Some("https://api.portal.dev".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_STATE_DIR).cloned(),
                    Some(".portal".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT_MS).copied(), Some(10_000));

                let (name, sub) = matches.subcommand().unwrap();
                assert_eq!(name, CMD_LOGIN);
                assert_eq!(
                    sub.get_one::<String>(ARG_USERNAME).cloned(),
                    Some("alice".to_string())
                );
                assert!(sub.get_flag(ARG_REMEMBER_ME));
            },
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("PORTAL_API_URL", Some("https://api.portal.dev")),
                ("PORTAL_STATE_DIR", Some("/tmp/portal")),
                ("PORTAL_TIMEOUT_MS", Some("2500")),
                ("PORTAL_CLEAR_ALL_COOKIES", Some("true")),
                ("PORTAL_PASSWORD", Some("secret")),
                ("PORTAL_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches =
                    new().get_matches_from(vec!["portal", "login", "--username", "alice"]);
                assert_eq!(
                    matches.get_one::<String>(ARG_STATE_DIR).cloned(),
                    Some("/tmp/portal".to_string())
                );
                assert_eq!(matches.get_one::<u64>(ARG_TIMEOUT_MS).copied(), Some(2500));
                assert!(matches.get_flag(ARG_CLEAR_ALL_COOKIES));
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let (_, sub) = matches.subcommand().unwrap();
                assert_eq!(
                    sub.get_one::<String>(ARG_PASSWORD).cloned(),
                    Some("secret".to_string())
                );
                assert!(!sub.get_flag(ARG_REMEMBER_ME));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("PORTAL_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["portal", "status"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5usize {
            temp_env::with_vars([("PORTAL_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["portal".to_string(), "token".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(u8::try_from(index).unwrap())
                );
            });
        }
    }

    #[test]
    fn test_login_password_is_optional() {
        temp_env::with_vars([("PORTAL_PASSWORD", None::<&str>)], || {
            let matches = new().get_matches_from(vec!["portal", "login", "-u", "alice"]);
            let (_, sub) = matches.subcommand().unwrap();
            assert_eq!(sub.get_one::<String>(ARG_PASSWORD), None);
        });
    }

    #[test]
    fn test_login_requires_username() {
        temp_env::with_vars([("PORTAL_USERNAME", None::<&str>)], || {
            let result = new().try_get_matches_from(vec!["portal", "login"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_navigate_path() {
        let matches = new().get_matches_from(vec!["portal", "navigate", "/admin"]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, CMD_NAVIGATE);
        assert_eq!(
            sub.get_one::<String>(ARG_PATH).cloned(),
            Some("/admin".to_string())
        );
    }
}
