pub mod keygen;
pub mod login;
pub mod navigate;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Logout(GlobalArgs),
    Status(GlobalArgs),
    Token(GlobalArgs),
    Whoami(GlobalArgs),
    Refresh(GlobalArgs),
    Remembered(GlobalArgs),
    Navigate(navigate::Args),
    Keygen,
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
