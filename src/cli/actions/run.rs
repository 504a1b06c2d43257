use crate::cli::actions::{keygen, login, navigate, session, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(globals) => session::logout(&globals),
        Action::Status(globals) => session::status(&globals),
        Action::Token(globals) => session::token(&globals),
        Action::Whoami(globals) => session::whoami(&globals).await,
        Action::Refresh(globals) => session::refresh(&globals).await,
        Action::Remembered(globals) => session::remembered(&globals),
        Action::Navigate(args) => navigate::execute(&args),
        Action::Keygen => keygen::execute(),
    }
}
