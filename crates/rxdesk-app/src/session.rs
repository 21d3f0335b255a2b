//! Session validity
//!
//! [`SessionContext`] is the single owner of the access token and user id. It
//! is a cheap cloneable handle shared by every loader; all clones observe the
//! same state. Only [`SessionContext::establish`] and
//! [`SessionContext::invalidate`] mutate it.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rxdesk_core::prelude::*;

use crate::config::{MemorySettingsStore, SettingsStore};

pub const KEY_ACCESS_TOKEN: &str = "access_token";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_LOGGED_IN: &str = "is_logged_in";

/// Token and user id of a valid session
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: i64,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

struct Inner {
    token: Option<String>,
    user_id: Option<i64>,
    logged_in: bool,
    store: Box<dyn SettingsStore>,
}

impl Inner {
    fn credentials(&self) -> Option<Credentials> {
        match (&self.token, self.user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() && user_id > 0 => {
                Some(Credentials {
                    token: token.clone(),
                    user_id,
                })
            }
            _ => None,
        }
    }
}

/// Shared handle to the process-wide session
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<RwLock<Inner>>,
}

impl SessionContext {
    /// Rebuild the session from a previously persisted store
    pub fn restore(store: impl SettingsStore + 'static) -> Self {
        let token = store.get(KEY_ACCESS_TOKEN);
        let user_id = store.get(KEY_USER_ID).and_then(|raw| match raw.trim().parse() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Ignoring unparsable persisted user id {:?}: {}", raw, e);
                None
            }
        });
        let logged_in = store.get(KEY_LOGGED_IN).as_deref() == Some("true");

        let session = Self {
            inner: Arc::new(RwLock::new(Inner {
                token,
                user_id,
                logged_in,
                store: Box::new(store),
            })),
        };
        debug!("Restored session (valid: {})", session.is_valid());
        session
    }

    /// A session backed by an in-memory store, initially logged out
    pub fn ephemeral() -> Self {
        Self::restore(MemorySettingsStore::new())
    }

    /// True iff a non-empty token and a positive user id are present
    pub fn is_valid(&self) -> bool {
        self.read().credentials().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user_id(&self) -> Option<i64> {
        self.read().user_id
    }

    /// The persisted logged-in flag, informational only
    pub fn is_logged_in(&self) -> bool {
        self.read().logged_in
    }

    /// Token and user id together, when the session is valid
    pub fn credentials(&self) -> Option<Credentials> {
        self.read().credentials()
    }

    /// Record a successful login
    ///
    /// The store is written first; in-memory state only changes once all three
    /// keys are persisted. If any write fails, keys already written are
    /// restored to their previous values so the store never mixes sessions.
    pub fn establish(&self, token: impl Into<String>, user_id: i64) -> Result<()> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::invalid_credentials("access token is empty"));
        }
        if user_id <= 0 {
            return Err(Error::invalid_credentials(format!(
                "user id must be positive, got {user_id}"
            )));
        }

        let mut inner = self.write();
        let user_id_value = user_id.to_string();
        let entries = [
            (KEY_ACCESS_TOKEN, token.as_str()),
            (KEY_USER_ID, user_id_value.as_str()),
            (KEY_LOGGED_IN, "true"),
        ];
        let previous: Vec<Option<String>> =
            entries.iter().map(|(key, _)| inner.store.get(key)).collect();

        for (written, (key, value)) in entries.iter().enumerate() {
            if let Err(e) = inner.store.put(key, value) {
                for ((key, _), old) in entries.iter().zip(&previous).take(written) {
                    let restored = match old {
                        Some(old) => inner.store.put(key, old),
                        None => inner.store.remove(key),
                    };
                    if let Err(rollback) = restored {
                        warn!("Failed to roll back {} in settings store: {}", key, rollback);
                    }
                }
                return Err(e);
            }
        }

        inner.token = Some(token);
        inner.user_id = Some(user_id);
        inner.logged_in = true;
        info!("Session established for user {}", user_id);
        Ok(())
    }

    /// Clear token, user id and logged-in flag. Idempotent.
    ///
    /// In-memory state is always cleared; failures to clear the store are
    /// logged and otherwise ignored.
    pub fn invalidate(&self) {
        let mut inner = self.write();
        let was_valid = inner.credentials().is_some();

        inner.token = None;
        inner.user_id = None;
        inner.logged_in = false;

        for key in [KEY_ACCESS_TOKEN, KEY_USER_ID, KEY_LOGGED_IN] {
            if let Err(e) = inner.store.remove(key) {
                warn!("Failed to clear {} from settings store: {}", key, e);
            }
        }

        if was_valid {
            info!("Session invalidated");
        } else {
            debug!("Session invalidated (already invalid)");
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("SessionContext")
            .field("has_token", &inner.token.as_deref().is_some_and(|t| !t.is_empty()))
            .field("user_id", &inner.user_id)
            .field("logged_in", &inner.logged_in)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::MockSettingsStore;
    use mockall::predicate::eq;

    #[test]
    fn test_ephemeral_session_is_invalid() {
        let session = SessionContext::ephemeral();
        assert!(!session.is_valid());
        assert_eq!(session.token(), None);
        assert_eq!(session.credentials(), None);
    }

    #[test]
    fn test_restore_valid_session() {
        let store = MemorySettingsStore::new()
            .with(KEY_ACCESS_TOKEN, "tok")
            .with(KEY_USER_ID, "12")
            .with(KEY_LOGGED_IN, "true");
        let session = SessionContext::restore(store);

        assert!(session.is_valid());
        assert!(session.is_logged_in());
        assert_eq!(
            session.credentials(),
            Some(Credentials {
                token: "tok".into(),
                user_id: 12
            })
        );
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let store = MemorySettingsStore::new()
            .with(KEY_ACCESS_TOKEN, "")
            .with(KEY_USER_ID, "12");
        assert!(!SessionContext::restore(store).is_valid());
    }

    #[test]
    fn test_non_positive_user_id_is_invalid() {
        for raw in ["0", "-1", "abc"] {
            let store = MemorySettingsStore::new()
                .with(KEY_ACCESS_TOKEN, "tok")
                .with(KEY_USER_ID, raw);
            assert!(!SessionContext::restore(store).is_valid(), "user_id {raw}");
        }
    }

    #[test]
    fn test_establish_then_invalidate() {
        let session = SessionContext::ephemeral();
        session.establish("tok", 3).unwrap();
        assert!(session.is_valid());

        session.invalidate();
        assert!(!session.is_valid());
        assert_eq!(session.token(), None);
        assert_eq!(session.user_id(), None);
        assert!(!session.is_logged_in());

        // Idempotent
        session.invalidate();
        assert!(!session.is_valid());
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionContext::ephemeral();
        let other = session.clone();
        session.establish("tok", 3).unwrap();
        assert!(other.is_valid());
        other.invalidate();
        assert!(!session.is_valid());
    }

    #[test]
    fn test_establish_rejects_bad_credentials() {
        let session = SessionContext::ephemeral();
        assert!(matches!(
            session.establish("  ", 3),
            Err(Error::InvalidCredentials { .. })
        ));
        assert!(matches!(
            session.establish("tok", 0),
            Err(Error::InvalidCredentials { .. })
        ));
        assert!(!session.is_valid());
    }

    #[test]
    fn test_establish_writes_all_keys() {
        let mut store = MockSettingsStore::new();
        store.expect_get().returning(|_| None);
        store
            .expect_put()
            .with(eq(KEY_ACCESS_TOKEN), eq("tok"))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_put()
            .with(eq(KEY_USER_ID), eq("42"))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_put()
            .with(eq(KEY_LOGGED_IN), eq("true"))
            .times(1)
            .returning(|_, _| Ok(()));

        let session = SessionContext::restore(store);
        session.establish("tok", 42).unwrap();
        assert!(session.is_valid());
    }

    #[test]
    fn test_establish_store_failure_leaves_session_unchanged() {
        let mut store = MockSettingsStore::new();
        store.expect_get().returning(|_| None);
        store
            .expect_put()
            .returning(|_, _| Err(Error::store("disk full")));

        let session = SessionContext::restore(store);
        assert!(session.establish("tok", 42).is_err());
        assert!(!session.is_valid());
    }

    #[test]
    fn test_establish_partial_failure_restores_written_keys() {
        let mut store = MockSettingsStore::new();
        store
            .expect_get()
            .with(eq(KEY_ACCESS_TOKEN))
            .returning(|_| Some("old-tok".into()));
        store.expect_get().with(eq(KEY_USER_ID)).returning(|_| None);
        store.expect_get().with(eq(KEY_LOGGED_IN)).returning(|_| None);
        store
            .expect_put()
            .with(eq(KEY_ACCESS_TOKEN), eq("tok"))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_put()
            .with(eq(KEY_USER_ID), eq("42"))
            .times(1)
            .returning(|_, _| Err(Error::store("disk full")));
        store
            .expect_put()
            .with(eq(KEY_ACCESS_TOKEN), eq("old-tok"))
            .times(1)
            .returning(|_, _| Ok(()));

        let session = SessionContext::restore(store);
        assert!(matches!(
            session.establish("tok", 42),
            Err(Error::Store { .. })
        ));
        assert!(!session.is_valid());
        assert_eq!(session.token().as_deref(), Some("old-tok"));
    }

    #[test]
    fn test_invalidate_clears_memory_even_if_store_fails() {
        let mut store = MockSettingsStore::new();
        store.expect_get().with(eq(KEY_ACCESS_TOKEN)).returning(|_| Some("tok".into()));
        store.expect_get().with(eq(KEY_USER_ID)).returning(|_| Some("5".into()));
        store.expect_get().with(eq(KEY_LOGGED_IN)).returning(|_| Some("true".into()));
        store
            .expect_remove()
            .times(3)
            .returning(|_| Err(Error::store("read-only")));

        let session = SessionContext::restore(store);
        assert!(session.is_valid());
        session.invalidate();
        assert!(!session.is_valid());
    }
}
