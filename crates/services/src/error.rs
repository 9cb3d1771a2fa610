//! Shared error types for the services crate.

use thiserror::Error;

use academy_core::model::{CatalogError, CourseId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SessionGate`.
///
/// Rejected credentials are not an error; only persistence failures are.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionGateError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CourseService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseServiceError {
    #[error("course {0} not found")]
    NotFound(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("admin capability required")]
    Forbidden,
    #[error("course {0} not found")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionGateError),
}
