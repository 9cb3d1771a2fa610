use std::sync::Arc;

use storage::repository::Storage;

use crate::catalog_service::CatalogService;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::session_gate::SessionGate;
use crate::Clock;

/// Assembles app-facing services over one `Storage`.
pub struct AppServices {
    gate: SessionGate,
    courses: Arc<CourseService>,
    catalog: Arc<CatalogService>,
}

impl AppServices {
    /// Build services whose session blob lives in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or session restore fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock).await
    }

    /// Build services with nothing persisted beyond the process.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the fixtures cannot be loaded.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::in_memory()?;
        Self::from_storage(&storage, clock).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Session` if the stored session cannot be read.
    pub async fn from_storage(storage: &Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let gate = SessionGate::restore(clock, Arc::clone(&storage.sessions)).await?;
        let courses = Arc::new(CourseService::new(Arc::clone(&storage.courses)));
        let catalog = Arc::new(CatalogService::new(
            clock,
            Arc::clone(&storage.catalog),
            Arc::clone(&storage.modules),
            Arc::clone(&storage.users),
        ));

        Ok(Self {
            gate,
            courses,
            catalog,
        })
    }

    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut SessionGate {
        &mut self.gate
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }
}
