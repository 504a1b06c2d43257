use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;
use clap::ArgMatches;
use std::ffi::OsString;
use tracing::Level;

/// `-v` count (or `PORTAL_LOG_LEVEL`) to a level; zero keeps logging off.
const fn log_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

fn parse<I, T>(args: I) -> Result<ArgMatches, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    commands::new().try_get_matches_from(args)
}

/// Reads the process arguments, installs the subscriber and returns the
/// action the binary should run.
///
/// # Errors
/// Fails when the subscriber cannot be installed or the subcommand is missing
/// a required value. Bad arguments print usage and exit.
pub fn start() -> Result<Action> {
    let matches = parse(std::env::args_os()).unwrap_or_else(|err| err.exit());

    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or_default();
    telemetry::init(
        log_level(verbosity),
        matches.get_flag(commands::logging::ARG_LOG_JSON),
    )?;

    dispatch::handler(&matches)
}
