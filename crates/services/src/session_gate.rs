use std::sync::Arc;

use academy_core::access::{self, Navigation, Route};
use academy_core::auth;
use academy_core::model::{SessionRecord, UserId};
use academy_core::time::IdSequence;
use storage::repository::SessionStore;

use crate::error::SessionGateError;
use crate::Clock;

/// Owns the signed-in actor and keeps it in step with the persisted blob.
///
/// Every mutation writes the store first and only then touches the in-memory
/// record, so a failed write leaves the gate exactly as it was.
pub struct SessionGate {
    clock: Clock,
    store: Arc<dyn SessionStore>,
    ids: IdSequence,
    current: Option<SessionRecord>,
}

impl SessionGate {
    /// Build a gate and pick up whatever session the store already holds.
    ///
    /// # Errors
    ///
    /// Returns `SessionGateError::Storage` if the store cannot be read. A blob
    /// that fails to parse is not an error; the gate starts signed out.
    pub async fn restore(
        clock: Clock,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, SessionGateError> {
        let current = store.get().await?;
        match &current {
            Some(record) => {
                tracing::info!(user = %record.id(), admin = record.is_admin(), "session restored");
            }
            None => tracing::debug!("no stored session"),
        }
        Ok(Self {
            clock,
            store,
            ids: IdSequence::new(),
            current,
        })
    }

    #[must_use]
    pub fn current(&self) -> Option<&SessionRecord> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.current.as_ref().is_some_and(SessionRecord::is_admin)
    }

    /// Sign in with one of the demo credential pairs.
    ///
    /// Returns `Ok(false)` for unknown credentials; the current session, if
    /// any, stays active in that case.
    ///
    /// # Errors
    ///
    /// Returns `SessionGateError::Storage` if the session cannot be persisted.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<bool, SessionGateError> {
        let Some(record) = auth::authenticate(email, password) else {
            tracing::warn!(email, "login rejected");
            return Ok(false);
        };

        self.store.set(&record).await?;
        tracing::info!(user = %record.id(), admin = record.is_admin(), "signed in");
        self.current = Some(record);
        Ok(true)
    }

    /// Sign out. Calling it while signed out is harmless.
    ///
    /// # Errors
    ///
    /// Returns `SessionGateError::Storage` if the stored blob cannot be removed.
    pub async fn logout(&mut self) -> Result<(), SessionGateError> {
        self.store.clear().await?;
        if let Some(record) = self.current.take() {
            tracing::info!(user = %record.id(), "signed out");
        }
        Ok(())
    }

    /// Create a learner session for a new account.
    ///
    /// The password is accepted but not checked or kept; confirmation belongs
    /// to `RegistrationForm`. Always returns `Ok(true)` once persisted.
    ///
    /// # Errors
    ///
    /// Returns `SessionGateError::Storage` if the session cannot be persisted.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<bool, SessionGateError> {
        let id = UserId::new(format!("user{}", self.ids.next(&self.clock)));
        let record = SessionRecord::learner(id, name, email);

        self.store.set(&record).await?;
        tracing::info!(user = %record.id(), "registered");
        self.current = Some(record);
        Ok(true)
    }

    /// Where a navigation to `route` ends up for the current actor.
    #[must_use]
    pub fn navigate(&self, route: Route) -> Navigation {
        access::resolve(route, self.current())
    }

    /// Home page for the current actor; the login page when signed out.
    #[must_use]
    pub fn landing(&self) -> Route {
        self.current().map_or(Route::Login, access::landing_route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::time::{fixed_clock, FIXED_TEST_TIMESTAMP};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::{InMemoryRepository, LocalSessionStore, StorageError};

    fn memory_store() -> Arc<dyn SessionStore> {
        Arc::new(LocalSessionStore::new(Arc::new(InMemoryRepository::new())))
    }

    async fn gate(store: Arc<dyn SessionStore>) -> SessionGate {
        SessionGate::restore(fixed_clock(), store).await.unwrap()
    }

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: Option<SessionRecord>,
        broken: AtomicBool,
    }

    #[async_trait]
    impl SessionStore for FlakyStore {
        async fn get(&self) -> Result<Option<SessionRecord>, StorageError> {
            Ok(self.inner.clone())
        }

        async fn set(&self, _record: &SessionRecord) -> Result<(), StorageError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("disk full".into()));
            }
            Ok(())
        }

        async fn clear(&self) -> Result<(), StorageError> {
            if self.broken.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("disk full".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn admin_credentials_grant_admin_session() {
        let store = memory_store();
        let mut gate = gate(Arc::clone(&store)).await;

        assert!(gate.login("admin@tum-academy.de", "password").await.unwrap());
        assert!(gate.is_authenticated());
        assert!(gate.is_admin());
        assert_eq!(store.get().await.unwrap().as_ref(), gate.current());
        assert_eq!(gate.landing(), Route::Admin);
    }

    #[tokio::test]
    async fn rejected_login_keeps_existing_session() {
        let mut gate = gate(memory_store()).await;
        assert!(gate.login("user@tum-academy.de", "password").await.unwrap());
        let before = gate.current().cloned();

        assert!(!gate.login("admin@tum-academy.de", "wrong").await.unwrap());
        assert_eq!(gate.current().cloned(), before);
        assert!(!gate.is_admin());
    }

    #[tokio::test]
    async fn register_mints_time_based_learner_ids() {
        let mut gate = gate(memory_store()).await;

        assert!(gate.register("Max", "max@example.com", "x").await.unwrap());
        let first = gate.current().cloned().unwrap();
        assert!(gate.register("Max", "max@example.com", "x").await.unwrap());
        let second = gate.current().cloned().unwrap();

        assert_eq!(first.id().as_str(), format!("user{}", FIXED_TEST_TIMESTAMP * 1000));
        assert_ne!(first.id(), second.id());
        assert!(!second.is_admin());
        assert_eq!(gate.landing(), Route::Dashboard);
    }

    #[tokio::test]
    async fn logout_clears_state_and_blob() {
        let store = memory_store();
        let mut gate = gate(Arc::clone(&store)).await;
        gate.login("user@tum-academy.de", "password").await.unwrap();

        gate.logout().await.unwrap();
        gate.logout().await.unwrap();

        assert!(!gate.is_authenticated());
        assert_eq!(store.get().await.unwrap(), None);
        assert_eq!(gate.landing(), Route::Login);
    }

    #[tokio::test]
    async fn restore_picks_up_persisted_session() {
        let store = memory_store();
        let mut first = gate(Arc::clone(&store)).await;
        first.login("admin@tum-academy.de", "password").await.unwrap();

        let second = gate(store).await;
        assert!(second.is_admin());
        assert_eq!(second.current(), first.current());
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        let store = Arc::new(FlakyStore::default());
        let mut gate = gate(Arc::clone(&store) as Arc<dyn SessionStore>).await;
        gate.login("user@tum-academy.de", "password").await.unwrap();

        store.broken.store(true, Ordering::SeqCst);
        let err = gate.login("admin@tum-academy.de", "password").await;
        assert!(matches!(err, Err(SessionGateError::Storage(_))));
        assert!(!gate.is_admin());

        assert!(gate.logout().await.is_err());
        assert!(gate.is_authenticated());
    }

    #[tokio::test]
    async fn navigation_follows_the_guard() {
        let mut gate = gate(memory_store()).await;
        assert_eq!(
            gate.navigate(Route::AdminCourses),
            Navigation::Redirect(Route::Login)
        );

        gate.login("user@tum-academy.de", "password").await.unwrap();
        assert_eq!(
            gate.navigate(Route::AdminCourses),
            Navigation::Redirect(Route::Dashboard)
        );
        assert_eq!(
            gate.navigate(Route::Login),
            Navigation::Redirect(Route::Dashboard)
        );
    }
}
