//! Plain-text rendering of the portal pages.

use std::error::Error;
use std::fmt::Write as _;

use academy_core::access::Route;
use academy_core::model::{AccountStatus, ModuleState, PublishStatus, Role};
use academy_core::CourseProgress;
use services::{Activity, AppServices};

type PageResult = Result<String, Box<dyn Error>>;

fn module_marker(state: ModuleState) -> &'static str {
    match state {
        ModuleState::Completed => "done",
        ModuleState::InProgress => "open",
        ModuleState::Locked => "locked",
    }
}

fn publish_label(status: PublishStatus) -> &'static str {
    match status {
        PublishStatus::Published => "published",
        PublishStatus::Draft => "draft",
    }
}

/// Course tree with lesson checkboxes; the active module is starred.
pub fn course_tree(view: &CourseProgress) -> PageResult {
    let course = view.course();
    let mut out = String::new();
    writeln!(out, "{} ({}%)", course.title(), view.overall_progress())?;
    for module in course.modules() {
        let active = if view.active_module_id() == Some(module.id()) { "*" } else { " " };
        writeln!(
            out,
            "{active} {} {} [{}] {}/{}",
            module.id(),
            module.title(),
            module_marker(module.state()),
            module.completed_lessons(),
            module.lessons().len()
        )?;
        for lesson in module.lessons() {
            let tick = if lesson.is_completed() { "x" } else { " " };
            writeln!(
                out,
                "    [{tick}] {} {} ({})",
                lesson.id(),
                lesson.title(),
                lesson.duration()
            )?;
        }
    }
    if view.is_completed() {
        writeln!(out, "course completed")?;
    }
    Ok(out)
}

/// Render a page that already passed the guard.
pub async fn render(route: &Route, app: &AppServices) -> PageResult {
    let actor = app.gate().current();
    let mut out = String::new();

    match route {
        Route::Landing => {
            writeln!(out, "Academy for taxi and private hire operators")?;
            writeln!(out, "Sign in at /login or create an account at /register.")?;
        }
        Route::Login => writeln!(out, "Sign in with: login <email> <password>")?,
        Route::Register => {
            writeln!(out, "Create an account with: register <name> <email> <password> <confirm>")?;
        }
        Route::Dashboard => {
            if let Some(actor) = actor {
                writeln!(out, "Welcome back, {}", actor.name())?;
            }
            for card in app.courses().enrollments().await? {
                writeln!(out, "{} {} ({}%)", card.course_id, card.title, card.progress)?;
                match card.next_lesson {
                    Some(next) => writeln!(
                        out,
                        "  next: {} / {} ({})",
                        next.module_title, next.lesson_title, next.duration
                    )?,
                    None if card.completed => writeln!(out, "  completed")?,
                    None => writeln!(out, "  nothing open")?,
                }
                for activity in &card.recent_activity {
                    match activity {
                        Activity::Lesson {
                            title,
                            module_title,
                        } => writeln!(out, "  finished lesson {title} ({module_title})")?,
                        Activity::Module { title } => writeln!(out, "  finished module {title}")?,
                    }
                }
            }
        }
        Route::Course { course_id } => {
            let view = app.courses().open_course(course_id).await?;
            out.push_str(&course_tree(&view)?);
        }
        Route::Admin => {
            let overview = app.catalog().overview(actor).await?;
            writeln!(out, "courses:     {}", overview.total_courses)?;
            writeln!(out, "published:   {}", overview.published_courses)?;
            writeln!(out, "active users: {}", overview.active_users)?;
            writeln!(out, "enrollments: {}", overview.total_enrollments)?;
        }
        Route::AdminCourses => {
            for course in app.catalog().list_courses(actor, "").await? {
                writeln!(
                    out,
                    "{} {} [{}] {} modules, {} enrolled, {} €, since {}",
                    course.id,
                    course.title,
                    publish_label(course.status),
                    course.module_count,
                    course.enrollments,
                    course.price_eur,
                    course.created_at.format("%Y-%m-%d")
                )?;
            }
        }
        Route::AdminModules { course_id } => {
            for module in app.catalog().list_modules(actor, course_id, "").await? {
                writeln!(
                    out,
                    "{}. {} {} [{}] {} lessons, {}",
                    module.order,
                    module.id,
                    module.title,
                    publish_label(module.status),
                    module.lesson_count,
                    module.duration
                )?;
            }
        }
        Route::AdminUsers => {
            for user in app.catalog().list_users(actor, "").await? {
                let role = match user.role {
                    Role::Admin => "admin",
                    Role::User => "user",
                };
                let status = match user.status {
                    AccountStatus::Active => "active",
                    AccountStatus::Inactive => "inactive",
                };
                writeln!(
                    out,
                    "{} {} <{}> {role}, {status}, {} courses",
                    user.id, user.name, user.email, user.enrolled_courses
                )?;
            }
        }
        Route::NotFound { path } => writeln!(out, "no page at {path}")?,
    }

    Ok(out)
}
