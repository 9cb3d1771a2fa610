#![forbid(unsafe_code)]

pub mod access;
pub mod auth;
pub mod model;
pub mod progress;
pub mod time;

pub use progress::CourseProgress;
pub use time::Clock;
