//! Route surface and the capability guard in front of it.

use std::fmt;

use crate::model::{CourseId, SessionRecord};

/// Every page the portal knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Login,
    Register,
    Dashboard,
    Course { course_id: CourseId },
    Admin,
    AdminCourses,
    AdminModules { course_id: CourseId },
    AdminUsers,
    NotFound { path: String },
}

/// Capability a route demands from the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Admin,
}

/// Outcome of the guard for a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    RedirectToLogin,
    /// Signed in, but without the admin capability.
    RedirectToDashboard,
}

/// Where the router should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Route {
    /// Parse a request path. Unknown paths map to `Route::NotFound`.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Landing,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["course", id] => Self::Course {
                course_id: CourseId::new(*id),
            },
            ["admin"] => Self::Admin,
            ["admin", "courses"] => Self::AdminCourses,
            ["admin", "modules", id] => Self::AdminModules {
                course_id: CourseId::new(*id),
            },
            ["admin", "users"] => Self::AdminUsers,
            _ => Self::NotFound {
                path: path.to_owned(),
            },
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".into(),
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Dashboard => "/dashboard".into(),
            Self::Course { course_id } => format!("/course/{course_id}"),
            Self::Admin => "/admin".into(),
            Self::AdminCourses => "/admin/courses".into(),
            Self::AdminModules { course_id } => format!("/admin/modules/{course_id}"),
            Self::AdminUsers => "/admin/users".into(),
            Self::NotFound { path } => path.clone(),
        }
    }

    #[must_use]
    pub fn requirement(&self) -> Requirement {
        match self {
            Self::Landing | Self::Login | Self::Register | Self::NotFound { .. } => {
                Requirement::Public
            }
            Self::Dashboard | Self::Course { .. } => Requirement::Authenticated,
            Self::Admin | Self::AdminCourses | Self::AdminModules { .. } | Self::AdminUsers => {
                Requirement::Admin
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Pure capability check: `(session, requirement) -> decision`.
#[must_use]
pub fn guard(session: Option<&SessionRecord>, requirement: Requirement) -> GuardDecision {
    match (requirement, session) {
        (Requirement::Public, _) => GuardDecision::Render,
        (_, None) => GuardDecision::RedirectToLogin,
        (Requirement::Admin, Some(s)) if !s.is_admin() => GuardDecision::RedirectToDashboard,
        (_, Some(_)) => GuardDecision::Render,
    }
}

/// Home page for a signed-in actor.
#[must_use]
pub fn landing_route(session: &SessionRecord) -> Route {
    if session.is_admin() {
        Route::Admin
    } else {
        Route::Dashboard
    }
}

/// Apply the guard to a route.
///
/// Signed-in actors visiting the login or register page are sent to their
/// landing route instead.
#[must_use]
pub fn resolve(route: Route, session: Option<&SessionRecord>) -> Navigation {
    if let (Route::Login | Route::Register, Some(s)) = (&route, session) {
        return Navigation::Redirect(landing_route(s));
    }

    match guard(session, route.requirement()) {
        GuardDecision::Render => Navigation::Render(route),
        GuardDecision::RedirectToLogin => Navigation::Redirect(Route::Login),
        GuardDecision::RedirectToDashboard => Navigation::Redirect(Route::Dashboard),
    }
}
