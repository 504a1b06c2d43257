use crate::crypto::AesEncryptor;
use anyhow::Result;
use secrecy::ExposeSecret;

/// Prints a fresh key suitable for `PORTAL_ENCRYPTION_KEY`.
/// # Errors
/// Never fails; returns `Result` to match the other actions.
pub fn execute() -> Result<()> {
    let key = AesEncryptor::generate_key();
    println!("{}", key.expose_secret());
    Ok(())
}
