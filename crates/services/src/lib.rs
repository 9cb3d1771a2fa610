#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod course_service;
pub mod error;
pub mod session_gate;

pub use academy_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogOverview, CatalogService};
pub use course_service::{Activity, CourseService, EnrollmentSummary, ModuleSummary, NextLesson};
pub use error::{AppServicesError, CatalogServiceError, CourseServiceError, SessionGateError};
pub use session_gate::SessionGate;
