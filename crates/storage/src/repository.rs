use academy_core::model::{
    Course, CourseId, CourseListing, ModuleId, ModuleListing, SessionRecord, UserAccount, UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::fixtures;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
}

/// Key used for the persisted session blob.
pub const SESSION_KEY: &str = "user";

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Browser-style string key/value storage.
#[async_trait]
pub trait LocalStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Holder of the single active session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session. A stored value that does not parse counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Overwrite the stored session with `record`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be encoded or written.
    async fn set(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Drop the stored session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Fixed source of learner-facing course trees.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fetch a fresh copy of a course tree.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError>;

    /// All course trees, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;
}

#[async_trait]
pub trait CourseCatalogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_listings(&self) -> Result<Vec<CourseListing>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken.
    async fn insert_listing(&self, listing: &CourseListing) -> Result<(), StorageError>;

    /// Returns whether a listing was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_listing(&self, id: &CourseId) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait ModuleCatalogRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_module_listings(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<ModuleListing>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken within the course.
    async fn insert_module_listing(
        &self,
        course_id: &CourseId,
        listing: &ModuleListing,
    ) -> Result<(), StorageError>;

    /// Replace every module row of a course (used for reordering).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn replace_module_listings(
        &self,
        course_id: &CourseId,
        listings: &[ModuleListing],
    ) -> Result<(), StorageError>;

    /// Drop every module row of a course. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_module_listings(&self, course_id: &CourseId) -> Result<usize, StorageError>;

    /// Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_module_listing(
        &self,
        course_id: &CourseId,
        id: &ModuleId,
    ) -> Result<bool, StorageError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_users(&self) -> Result<Vec<UserAccount>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken.
    async fn insert_user(&self, user: &UserAccount) -> Result<(), StorageError>;

    /// Returns whether an account was removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_user(&self, id: &UserId) -> Result<bool, StorageError>;
}

//
// ─── SESSION STORE OVER LOCAL STORAGE ──────────────────────────────────────────
//

/// Keeps the session as a JSON blob under `SESSION_KEY`.
#[derive(Clone)]
pub struct LocalSessionStore {
    storage: Arc<dyn LocalStorage>,
}

impl LocalSessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SessionStore for LocalSessionStore {
    async fn get(&self) -> Result<Option<SessionRecord>, StorageError> {
        let Some(raw) = self.storage.get_item(SESSION_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable session blob");
                Ok(None)
            }
        }
    }

    async fn set(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let raw = serde_json::to_string(record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set_item(SESSION_KEY, &raw).await
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(SESSION_KEY).await
    }
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    local: Arc<Mutex<HashMap<String, String>>>,
    courses: Arc<Mutex<Vec<Course>>>,
    listings: Arc<Mutex<Vec<CourseListing>>>,
    modules: Arc<Mutex<HashMap<CourseId, Vec<ModuleListing>>>>,
    users: Arc<Mutex<Vec<UserAccount>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

impl InMemoryRepository {
    /// An empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository preloaded with the portal's demo catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSeed` if the fixture data violates a domain rule.
    pub fn with_fixtures() -> Result<Self, StorageError> {
        let seed = |e: fixtures::SeedError| StorageError::InvalidSeed(e.to_string());

        let repo = Self::new();
        *lock(&repo.courses)? = fixtures::course_trees().map_err(seed)?;
        *lock(&repo.listings)? = fixtures::course_listings().map_err(seed)?;
        *lock(&repo.modules)? = fixtures::module_listings().into_iter().collect();
        *lock(&repo.users)? = fixtures::user_accounts().map_err(seed)?;
        Ok(repo)
    }
}

#[async_trait]
impl LocalStorage for InMemoryRepository {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.local)?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.local)?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.local)?.remove(key);
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn get_course(&self, id: &CourseId) -> Result<Option<Course>, StorageError> {
        Ok(lock(&self.courses)?.iter().find(|c| c.id() == id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        Ok(lock(&self.courses)?.clone())
    }
}

#[async_trait]
impl CourseCatalogRepository for InMemoryRepository {
    async fn list_listings(&self) -> Result<Vec<CourseListing>, StorageError> {
        Ok(lock(&self.listings)?.clone())
    }

    async fn insert_listing(&self, listing: &CourseListing) -> Result<(), StorageError> {
        let mut guard = lock(&self.listings)?;
        if guard.iter().any(|l| l.id == listing.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(listing.clone());
        Ok(())
    }

    async fn delete_listing(&self, id: &CourseId) -> Result<bool, StorageError> {
        let mut guard = lock(&self.listings)?;
        let before = guard.len();
        guard.retain(|l| &l.id != id);
        Ok(guard.len() != before)
    }
}

#[async_trait]
impl ModuleCatalogRepository for InMemoryRepository {
    async fn list_module_listings(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<ModuleListing>, StorageError> {
        Ok(lock(&self.modules)?
            .get(course_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_module_listing(
        &self,
        course_id: &CourseId,
        listing: &ModuleListing,
    ) -> Result<(), StorageError> {
        let mut guard = lock(&self.modules)?;
        let rows = guard.entry(course_id.clone()).or_default();
        if rows.iter().any(|m| m.id == listing.id) {
            return Err(StorageError::Conflict);
        }
        rows.push(listing.clone());
        Ok(())
    }

    async fn replace_module_listings(
        &self,
        course_id: &CourseId,
        listings: &[ModuleListing],
    ) -> Result<(), StorageError> {
        lock(&self.modules)?.insert(course_id.clone(), listings.to_vec());
        Ok(())
    }

    async fn delete_module_listings(&self, course_id: &CourseId) -> Result<usize, StorageError> {
        Ok(lock(&self.modules)?.remove(course_id).map_or(0, |rows| rows.len()))
    }

    async fn delete_module_listing(
        &self,
        course_id: &CourseId,
        id: &ModuleId,
    ) -> Result<bool, StorageError> {
        let mut guard = lock(&self.modules)?;
        let Some(rows) = guard.get_mut(course_id) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|m| &m.id != id);
        Ok(rows.len() != before)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn list_users(&self) -> Result<Vec<UserAccount>, StorageError> {
        Ok(lock(&self.users)?.clone())
    }

    async fn insert_user(&self, user: &UserAccount) -> Result<(), StorageError> {
        let mut guard = lock(&self.users)?;
        if guard.iter().any(|u| u.id == user.id) {
            return Err(StorageError::Conflict);
        }
        guard.push(user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> Result<bool, StorageError> {
        let mut guard = lock(&self.users)?;
        let before = guard.len();
        guard.retain(|u| &u.id != id);
        Ok(guard.len() != before)
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub local: Arc<dyn LocalStorage>,
    pub sessions: Arc<dyn SessionStore>,
    pub courses: Arc<dyn CourseRepository>,
    pub catalog: Arc<dyn CourseCatalogRepository>,
    pub modules: Arc<dyn ModuleCatalogRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Storage {
    /// Everything in memory, catalog seeded from fixtures.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSeed` if the fixtures are inconsistent.
    pub fn in_memory() -> Result<Self, StorageError> {
        let repo = InMemoryRepository::with_fixtures()?;
        let local: Arc<dyn LocalStorage> = Arc::new(repo.clone());
        Ok(Self::assemble(local, repo))
    }

    /// Catalog from fixtures, session blob kept in `local`.
    pub(crate) fn assemble(local: Arc<dyn LocalStorage>, repo: InMemoryRepository) -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(LocalSessionStore::new(Arc::clone(&local)));
        let courses: Arc<dyn CourseRepository> = Arc::new(repo.clone());
        let catalog: Arc<dyn CourseCatalogRepository> = Arc::new(repo.clone());
        let modules: Arc<dyn ModuleCatalogRepository> = Arc::new(repo.clone());
        let users: Arc<dyn UserRepository> = Arc::new(repo);
        Self {
            local,
            sessions,
            courses,
            catalog,
            modules,
            users,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (InMemoryRepository, LocalSessionStore) {
        let repo = InMemoryRepository::new();
        let store = LocalSessionStore::new(Arc::new(repo.clone()));
        (repo, store)
    }

    #[tokio::test]
    async fn session_round_trips_through_blob() {
        let (repo, store) = store();
        let record = SessionRecord::new(UserId::new("user1"), "Test User", "user@x.de", false);
        store.set(&record).await.unwrap();

        let raw = repo.get_item(SESSION_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"isAdmin\":false"));
        assert_eq!(store.get().await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn corrupt_blob_reads_as_absent() {
        let (repo, store) = store();
        repo.set_item(SESSION_KEY, "{not json").await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_removes_blob() {
        let (repo, store) = store();
        let record = SessionRecord::learner(UserId::new("u"), "U", "u@x.de");
        store.set(&record).await.unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(repo.get_item(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fixtures_load_and_courses_are_fresh_copies() {
        let storage = Storage::in_memory().unwrap();
        let id = CourseId::new("1");
        let a = storage.courses.get_course(&id).await.unwrap().unwrap();
        let b = storage.courses.get_course(&id).await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.modules().len(), 4);
        assert!(storage.courses.get_course(&CourseId::new("99")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn listing_insert_conflicts_and_delete_reports() {
        let repo = InMemoryRepository::with_fixtures().unwrap();
        let existing = repo.list_listings().await.unwrap().remove(0);
        assert!(matches!(
            repo.insert_listing(&existing).await,
            Err(StorageError::Conflict)
        ));
        assert!(repo.delete_listing(&existing.id).await.unwrap());
        assert!(!repo.delete_listing(&existing.id).await.unwrap());
    }
}
