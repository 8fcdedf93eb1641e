use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::routing::{self, Destination, TokenState};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("refusing to store an empty token")]
    EmptyToken,

    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store lock poisoned")]
    Poisoned,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionStore — where the current bearer token lives
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Holder of the single bearer token of the current session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        let slot = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(slot.clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        let mut slot = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self.inner.lock().map_err(|_| SessionError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}

/// Keeps the token in a single file; a missing file means no session.
///
/// Default location: `$XDG_CONFIG_HOME/rolegate/session`, falling back to
/// `~/.config/rolegate/session`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn default_path() -> PathBuf {
        let base = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
            .unwrap_or_else(|_| PathBuf::from("."));

        base.join("rolegate").join("session")
    }

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let token = content.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, token)?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionManager — login / logout / redirect
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Token lifecycle around a store: set on login, cleared on logout or when
/// the stored token turns out to be unusable.
pub struct SessionManager<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn login(&self, token: &str) -> Result<(), SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        self.store.save(token)?;
        tracing::info!("session token stored");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        tracing::info!("session cleared");
        Ok(())
    }

    pub fn current_token(&self) -> Result<Option<String>, SessionError> {
        self.store.load()
    }

    /// State of the stored token at `now`, without touching the store.
    pub fn state(&self, now: DateTime<Utc>) -> Result<TokenState, SessionError> {
        let token = self.store.load()?;
        Ok(routing::classify(token.as_deref(), now))
    }

    /// Route the stored token. A token that is present but no longer valid
    /// is dropped from the store.
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(TokenState, Destination), SessionError> {
        let token = self.store.load()?;
        let (state, destination) = routing::decide(token.as_deref(), now);
        if state == TokenState::Expired {
            tracing::info!("stored token is no longer valid, clearing session");
            self.store.clear()?;
        }
        Ok((state, destination))
    }
}

impl SessionManager<FileSessionStore> {
    pub fn with_file(path: PathBuf) -> Self {
        Self::new(FileSessionStore::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::TimeZone;
    use serde_json::json;

    fn token(payload: serde_json::Value) -> String {
        format!("e30.{}.sig", URL_SAFE_NO_PAD.encode(payload.to_string()))
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_login_then_resolve() {
        let manager = SessionManager::new(MemorySessionStore::default());
        manager
            .login(&token(json!({"role": "instructor", "exp": 2000})))
            .unwrap();

        assert_eq!(
            manager.resolve(at(1000)).unwrap(),
            (
                TokenState::ValidWithRole(crate::auth::Role::Instructor),
                Destination::InstructorArea
            )
        );
        assert!(manager.current_token().unwrap().is_some());
    }

    #[test]
    fn test_login_rejects_empty_token() {
        let manager = SessionManager::new(MemorySessionStore::default());
        assert!(matches!(manager.login("   "), Err(SessionError::EmptyToken)));
        assert_eq!(manager.current_token().unwrap(), None);
    }

    #[test]
    fn test_login_trims_token() {
        let manager = SessionManager::new(MemorySessionStore::default());
        manager.login("  a.b.c\n").unwrap();
        assert_eq!(manager.current_token().unwrap().as_deref(), Some("a.b.c"));
    }

    #[test]
    fn test_expired_token_is_cleared_on_resolve() {
        let manager = SessionManager::new(MemorySessionStore::default());
        manager
            .login(&token(json!({"role": "admin", "exp": 1000})))
            .unwrap();

        assert_eq!(
            manager.resolve(at(1000)).unwrap(),
            (TokenState::Expired, Destination::DefaultArea)
        );
        assert_eq!(manager.current_token().unwrap(), None);
    }

    #[derive(Clone, Default)]
    struct CountingStore {
        inner: MemorySessionStore,
        loads: Arc<Mutex<usize>>,
    }

    impl SessionStore for CountingStore {
        fn load(&self) -> Result<Option<String>, SessionError> {
            *self.loads.lock().unwrap() += 1;
            self.inner.load()
        }

        fn save(&self, token: &str) -> Result<(), SessionError> {
            self.inner.save(token)
        }

        fn clear(&self) -> Result<(), SessionError> {
            self.inner.clear()
        }
    }

    #[test]
    fn test_resolve_reads_store_once() {
        let store = CountingStore::default();
        let manager = SessionManager::new(store.clone());
        manager
            .login(&token(json!({"role": "admin", "exp": 2000})))
            .unwrap();

        let (state, destination) = manager.resolve(at(1000)).unwrap();
        assert_eq!(state.destination(), destination);
        assert_eq!(destination, Destination::AdminArea);
        assert_eq!(*store.loads.lock().unwrap(), 1);
    }

    #[test]
    fn test_state_does_not_clear() {
        let manager = SessionManager::new(MemorySessionStore::default());
        manager.login("xyz").unwrap();
        assert_eq!(manager.state(at(0)).unwrap(), TokenState::Expired);
        assert_eq!(manager.current_token().unwrap().as_deref(), Some("xyz"));
    }

    #[test]
    fn test_logout_routes_to_default() {
        let store = MemorySessionStore::default();
        let manager = SessionManager::new(store.clone());
        manager
            .login(&token(json!({"role": "admin", "exp": 2000})))
            .unwrap();
        manager.logout().unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(
            manager.resolve(at(1000)).unwrap(),
            (TokenState::NoToken, Destination::DefaultArea)
        );
    }

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session");
        let manager = SessionManager::with_file(path.clone());

        assert_eq!(manager.current_token().unwrap(), None);
        manager.login("a.b.c").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a.b.c");
        assert_eq!(manager.current_token().unwrap().as_deref(), Some("a.b.c"));

        manager.logout().unwrap();
        assert!(!path.exists());
        // clearing twice is fine
        manager.logout().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session"));
        store.save("a.b.c").unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_blank_session_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(FileSessionStore::new(path).load().unwrap(), None);
    }
}
