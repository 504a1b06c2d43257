//! Path-scoped cookie storage. [`CookieJar`] models browser semantics (default
//! path, path matching, most specific path wins on lookup) and the stores wrap
//! it: [`MemoryCookieStore`] behaves like a browser tab, [`FileCookieStore`]
//! keeps the jar on disk between CLI runs.
//!
//! Cookie values hold session material; stores never log them.

use crate::errors::AuthError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

pub const ROOT_PATH: &str = "/";

/// Key/value persistence scoped by path.
pub trait CookieStore: Send + Sync {
    /// Returns the value visible from the current document path.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the backing store cannot be read.
    fn get(&self, name: &str) -> Result<Option<String>, AuthError>;

    /// # Errors
    /// Returns [`AuthError::Storage`] if the backing store cannot be written.
    fn set(&self, name: &str, value: &str, path: &str) -> Result<(), AuthError>;

    /// Deletes the cookie stored at `path`, or at the default path when `None`.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the backing store cannot be written.
    fn delete(&self, name: &str, path: Option<&str>) -> Result<(), AuthError>;

    /// # Errors
    /// Returns [`AuthError::Storage`] if the backing store cannot be written.
    fn delete_all(&self) -> Result<(), AuthError>;

    /// Names visible from the current document path.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the backing store cannot be read.
    fn names(&self) -> Result<Vec<String>, AuthError>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub path: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CookieJar {
    cookies: Vec<StoredCookie>,
}

impl CookieJar {
    /// Longest matching path first, like `document.cookie` ordering.
    #[must_use]
    pub fn get(&self, name: &str, document_path: &str) -> Option<&str> {
        self.cookies
            .iter()
            .filter(|cookie| cookie.name == name && path_matches(&cookie.path, document_path))
            .max_by_key(|cookie| cookie.path.len())
            .map(|cookie| cookie.value.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str, path: &str) {
        if let Some(existing) = self
            .cookies
            .iter_mut()
            .find(|cookie| cookie.name == name && cookie.path == path)
        {
            existing.value = value.to_string();
        } else {
            self.cookies.push(StoredCookie {
                name: name.to_string(),
                path: path.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Returns `true` when a cookie was removed.
    pub fn delete(&mut self, name: &str, path: &str) -> bool {
        let before = self.cookies.len();
        self.cookies
            .retain(|cookie| !(cookie.name == name && cookie.path == path));
        before != self.cookies.len()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    #[must_use]
    pub fn names(&self, document_path: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .cookies
            .iter()
            .filter(|cookie| path_matches(&cookie.path, document_path))
            .map(|cookie| cookie.name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// The path a browser assigns when a cookie is written without one: the
/// directory of the document path.
#[must_use]
pub fn default_path(document_path: &str) -> String {
    if !document_path.starts_with('/') {
        return ROOT_PATH.to_string();
    }
    match document_path.rfind('/') {
        Some(0) | None => ROOT_PATH.to_string(),
        Some(index) => document_path[..index].to_string(),
    }
}

/// Whether a cookie stored at `cookie_path` is visible from `request_path`.
#[must_use]
pub fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/')
            || request_path[cookie_path.len()..].starts_with('/'))
}

fn resolve_path(path: Option<&str>, document_path: &str) -> String {
    match path.map(str::trim) {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => default_path(document_path),
    }
}

struct MemoryState {
    document_path: String,
    jar: CookieJar,
}

/// In-process cookie store; the equivalent of one browser tab.
pub struct MemoryCookieStore {
    state: Mutex<MemoryState>,
}

impl MemoryCookieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::at(ROOT_PATH)
    }

    /// A store whose current document is `document_path`.
    #[must_use]
    pub fn at(document_path: &str) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                document_path: document_path.to_string(),
                jar: CookieJar::default(),
            }),
        }
    }

    /// Moves the current document, changing which cookies are visible and the
    /// default path for deletes.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the store lock is poisoned.
    pub fn navigate(&self, document_path: &str) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        state.document_path = document_path.to_string();
        Ok(())
    }

    /// Snapshot of the raw jar.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] if the store lock is poisoned.
    pub fn jar(&self) -> Result<CookieJar, AuthError> {
        Ok(self.lock()?.jar.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Storage("cookie store lock poisoned".to_string()))
    }
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Result<Option<String>, AuthError> {
        let state = self.lock()?;
        Ok(state
            .jar
            .get(name, &state.document_path)
            .map(ToString::to_string))
    }

    fn set(&self, name: &str, value: &str, path: &str) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        state.jar.set(name, value, path);
        Ok(())
    }

    fn delete(&self, name: &str, path: Option<&str>) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        let path = resolve_path(path, &state.document_path);
        state.jar.delete(name, &path);
        Ok(())
    }

    fn delete_all(&self) -> Result<(), AuthError> {
        self.lock()?.jar.clear();
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>, AuthError> {
        let state = self.lock()?;
        Ok(state.jar.names(&state.document_path))
    }
}

/// Cookie jar persisted as JSON, read and rewritten on every operation.
/// On unix the file is created with owner-only permissions.
pub struct FileCookieStore {
    path: PathBuf,
    document_path: String,
}

impl FileCookieStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document_path: ROOT_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_document_path(mut self, document_path: &str) -> Self {
        self.document_path = document_path.to_string();
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<CookieJar, AuthError> {
        if !self.path.exists() {
            return Ok(CookieJar::default());
        }
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            AuthError::Storage(format!("Failed to read {}: {err}", self.path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(CookieJar::default());
        }
        serde_json::from_str(&raw).map_err(|err| {
            AuthError::Storage(format!("Failed to parse {}: {err}", self.path.display()))
        })
    }

    fn save(&self, jar: &CookieJar) -> Result<(), AuthError> {
        let json = serde_json::to_vec_pretty(jar)
            .map_err(|err| AuthError::Serialization(format!("Failed to encode cookies: {err}")))?;
        write_private(&self.path, &json)?;
        debug!("saved {} cookies to {}", jar.len(), self.path.display());
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut CookieJar)) -> Result<(), AuthError> {
        let mut jar = self.load()?;
        apply(&mut jar);
        self.save(&jar)
    }
}

impl CookieStore for FileCookieStore {
    fn get(&self, name: &str) -> Result<Option<String>, AuthError> {
        let jar = self.load()?;
        Ok(jar.get(name, &self.document_path).map(ToString::to_string))
    }

    fn set(&self, name: &str, value: &str, path: &str) -> Result<(), AuthError> {
        self.update(|jar| jar.set(name, value, path))
    }

    fn delete(&self, name: &str, path: Option<&str>) -> Result<(), AuthError> {
        let path = resolve_path(path, &self.document_path);
        self.update(|jar| {
            jar.delete(name, &path);
        })
    }

    fn delete_all(&self) -> Result<(), AuthError> {
        self.update(CookieJar::clear)
    }

    fn names(&self) -> Result<Vec<String>, AuthError> {
        Ok(self.load()?.names(&self.document_path))
    }
}

/// Writes `contents` through a temporary sibling file and renames it into place.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> Result<(), AuthError> {
    let storage_err =
        |err: std::io::Error| AuthError::Storage(format!("Failed to write {}: {err}", path.display()));

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(storage_err)?;
    }

    let tmp = path.with_extension("tmp");
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp).map_err(storage_err)?;
    file.write_all(contents).map_err(storage_err)?;
    file.sync_all().map_err(storage_err)?;
    fs::rename(&tmp, path).map_err(storage_err)
}
