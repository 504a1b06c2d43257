//! Client fingerprint sent with every login so the backend can tie sessions to
//! a device. None of these fields are secret.

use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserInfo {
    pub session_id: String,
    pub browser_id: String,
    pub browser_name: String,
    pub browser_version: String,
}

impl BrowserInfo {
    /// Fingerprint for this process: a fresh session id, the given browser id
    /// (or a new random one), and the client build as name/version.
    #[must_use]
    pub fn detect(browser_id: Option<&str>) -> Self {
        let browser_id = browser_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);

        Self {
            session_id: Ulid::new().to_string(),
            browser_id,
            browser_name: env!("CARGO_PKG_NAME").to_string(),
            browser_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
