use crate::cli::globals::GlobalArgs;
use crate::guard::{AuthGuard, SessionStatus};
use crate::routes::{Resolution, Router};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
}

/// Resolves `path` against the stored session and prints where it lands.
/// # Errors
/// Never fails once the arguments are parsed; returns `Result` to match the
/// other actions.
pub fn execute(args: &Args) -> Result<()> {
    let session = args.globals.session_context(&args.path);
    println!("{}", describe(&session, &args.path));
    Ok(())
}

pub(crate) fn describe<S: SessionStatus>(session: S, path: &str) -> String {
    let router = Router::new(AuthGuard::new(session));
    match router.navigate(path) {
        (at, Resolution::Render { layout, page, title }) => {
            format!("{at}: {title} ({page:?} in {layout:?} layout)")
        }
        (at, Resolution::Redirect(next)) => format!("{at}: too many redirects, next {next}"),
    }
}
