//! Session state machine and credential persistence.
//!
//! ```text
//! Anonymous --login--> Authenticated
//! Authenticated --logout | receive_unauthorized--> Anonymous
//! ```
//!
//! No transition retries anything. [`SessionManager`] pairs the state with a
//! [`CredentialStore`] so the persisted token always follows the state.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::CredentialError;
use crate::net::UserProfile;

/// Key of the persisted credential.
pub const CREDENTIAL_KEY: &str = "access_token";

/// An authenticated user's credential and cached profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    /// Populated by the first successful profile refresh.
    pub user: Option<UserProfile>,
    /// Set when a post-spend balance refresh failed; `user.balance` is the last known value.
    pub balance_stale: bool,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), user: None, balance_stale: false }
    }

    #[must_use]
    pub fn balance(&self) -> Option<f64> {
        self.user.as_ref().map(|u| u.balance)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn login(&mut self, token: impl Into<String>) {
        *self = Self::Authenticated(Session::new(token));
    }

    pub fn logout(&mut self) {
        *self = Self::Anonymous;
    }

    /// The server rejected the credential.
    pub fn receive_unauthorized(&mut self) {
        *self = Self::Anonymous;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(s) => Some(s),
            Self::Anonymous => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Authenticated(s) => Some(s),
            Self::Anonymous => None,
        }
    }
}

// =============================================================================
// CREDENTIAL STORES
// =============================================================================

/// Persists the single opaque credential. Expiry is never tracked here.
pub trait CredentialStore: Send + Sync {
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, CredentialError>;

    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be written.
    fn save(&self, token: &str) -> Result<(), CredentialError>;

    /// Remove the credential. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the backing storage cannot be modified.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// JSON file holding `{"access_token": "..."}`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialError::Io(e.to_string())),
        };
        let value: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| CredentialError::Malformed(e.to_string()))?;
        let token = value
            .get(CREDENTIAL_KEY)
            .and_then(serde_json::Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Ok(token)
    }

    fn save(&self, token: &str) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CredentialError::Io(e.to_string()))?;
        }
        let body = serde_json::json!({ CREDENTIAL_KEY: token });
        let io = |e: std::io::Error| CredentialError::Io(e.to_string());

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // Owner read/write only; the file holds a bearer token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io)?;
        // `mode` only applies on create; tighten a file left by an older run.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).map_err(io)?;
        }
        file.write_all(body.to_string().as_bytes()).map_err(io)
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialError::Io(e.to_string())),
        }
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Mutex::new(Some(token.into())) }
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, CredentialError> {
        self.token
            .lock()
            .map_err(|_| CredentialError::Io("credential lock poisoned".into()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), CredentialError> {
        *self.slot()? = Some(token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.slot()? = None;
        Ok(())
    }
}

// =============================================================================
// MANAGER
// =============================================================================

/// Session state plus the store that mirrors it.
pub struct SessionManager {
    state: SessionState,
    store: Box<dyn CredentialStore>,
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Box<dyn CredentialStore>) -> Self {
        Self { state: SessionState::Anonymous, store }
    }

    /// Adopt a previously stored credential. Returns whether one was found.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the store cannot be read.
    pub fn restore(&mut self) -> Result<bool, CredentialError> {
        match self.store.load()? {
            Some(token) => {
                self.state.login(token);
                tracing::info!("restored stored session");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist `token` and enter the authenticated state.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the token cannot be stored; the state is unchanged.
    pub fn login(&mut self, token: &str) -> Result<(), CredentialError> {
        self.store.save(token)?;
        self.state.login(token);
        tracing::info!("session started");
        Ok(())
    }

    /// Drop the session and the stored credential.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the store cannot be cleared. The
    /// in-memory session is gone either way.
    pub fn logout(&mut self) -> Result<(), CredentialError> {
        self.state.logout();
        tracing::info!("session ended");
        self.store.clear()
    }

    /// Tear down after the server rejected the credential.
    pub fn receive_unauthorized(&mut self) {
        self.state.receive_unauthorized();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "stored credential could not be cleared after rejection");
        }
        tracing::warn!("credential rejected; session cleared");
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// The bearer credential of the current session.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session().map(|s| s.token.as_str())
    }

    #[must_use]
    pub fn balance(&self) -> Option<f64> {
        self.session().and_then(Session::balance)
    }

    /// Record a freshly fetched profile; the balance is current again.
    pub fn set_profile(&mut self, user: UserProfile) {
        if let Some(session) = self.state.session_mut() {
            session.user = Some(user);
            session.balance_stale = false;
        }
    }

    /// Keep the last known balance but flag it as out of date.
    pub fn mark_balance_stale(&mut self) {
        if let Some(session) = self.state.session_mut() {
            session.balance_stale = true;
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }
}
