use std::error::Error;

use academy_core::access::{Navigation, Route};
use academy_core::auth::RegistrationForm;
use academy_core::model::{
    CourseId, CourseListingDraft, LessonCompletion, LessonId, ModuleId, ModuleListingDraft,
    UserAccountDraft,
};
use services::{AppServices, Clock};

mod cli;
mod logging;
mod pages;

use cli::{AdminAction, Args, Command, print_usage, prepare_sqlite_file};

#[derive(Debug)]
struct LoginRejected;

impl std::fmt::Display for LoginRejected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid email or password")
    }
}

impl Error for LoginRejected {}

fn show_actor(app: &AppServices) {
    match app.gate().current() {
        Some(actor) => {
            let role = if actor.is_admin() { "admin" } else { "learner" };
            println!("{} <{}> ({role}, id {})", actor.name(), actor.email(), actor.id());
        }
        None => println!("signed out"),
    }
}

/// Follow the guard, then render wherever it lands.
async fn open(app: &AppServices, route: Route) -> Result<(), Box<dyn Error>> {
    let target = match app.gate().navigate(route) {
        Navigation::Render(route) => route,
        Navigation::Redirect(to) => {
            println!("-> {to}");
            to
        }
    };
    print!("{}", pages::render(&target, app).await?);
    Ok(())
}

async fn study(
    app: &AppServices,
    course_id: CourseId,
    steps: Vec<(ModuleId, LessonId)>,
) -> Result<(), Box<dyn Error>> {
    let route = Route::Course {
        course_id: course_id.clone(),
    };
    if let Navigation::Redirect(to) = app.gate().navigate(route) {
        println!("-> {to}");
        print!("{}", pages::render(&to, app).await?);
        return Ok(());
    }

    let courses = app.courses();
    let mut view = courses.open_course(&course_id).await?;
    for (module_id, lesson_id) in steps {
        let note = match courses.complete_lesson(&mut view, &module_id, &lesson_id) {
            LessonCompletion::Completed(step) => {
                let mut note = String::from("completed");
                if step.module_completed {
                    note.push_str(&format!(", module {} done", step.module_id));
                }
                if let Some(next) = step.unlocked {
                    note.push_str(&format!(", {next} unlocked"));
                }
                note
            }
            LessonCompletion::AlreadyCompleted => "already completed".into(),
            LessonCompletion::ModuleLocked => "module locked".into(),
            LessonCompletion::UnknownModule => "unknown module".into(),
            LessonCompletion::UnknownLesson => "unknown lesson".into(),
        };
        println!("{module_id}:{lesson_id} {note}");
        view.select_module(&module_id);
    }
    print!("{}", pages::course_tree(&view)?);
    Ok(())
}

/// Apply one catalog edit, then render the table it touched.
async fn admin(app: &AppServices, action: AdminAction) -> Result<(), Box<dyn Error>> {
    if let Navigation::Redirect(to) = app.gate().navigate(Route::Admin) {
        println!("-> {to}");
        print!("{}", pages::render(&to, app).await?);
        return Ok(());
    }

    let catalog = app.catalog();
    let actor = app.gate().current();
    let (note, page) = match action {
        AdminAction::AddCourse {
            title,
            description,
            price,
        } => {
            let draft = CourseListingDraft {
                title,
                description,
                price,
            };
            let course = catalog.create_course(actor, draft).await?;
            (format!("course {} created", course.id), Route::AdminCourses)
        }
        AdminAction::RemoveCourse { course_id } => {
            let removed = catalog.delete_course(actor, &course_id).await?;
            let note = if removed { "deleted" } else { "not found" };
            (format!("course {course_id} {note}"), Route::AdminCourses)
        }
        AdminAction::AddModule {
            course_id,
            title,
            description,
            duration,
        } => {
            let draft = ModuleListingDraft {
                title,
                description,
                duration,
            };
            let module = catalog.create_module(actor, &course_id, draft).await?;
            let note = format!("module {} created at position {}", module.id, module.order);
            (note, Route::AdminModules { course_id })
        }
        AdminAction::RemoveModule {
            course_id,
            module_id,
        } => {
            let removed = catalog.delete_module(actor, &course_id, &module_id).await?;
            let note = if removed { "deleted" } else { "not found" };
            (format!("module {module_id} {note}"), Route::AdminModules { course_id })
        }
        AdminAction::ModuleUp {
            course_id,
            module_id,
        } => {
            let moved = catalog.move_module_up(actor, &course_id, &module_id).await?;
            let note = if moved { "moved up" } else { "not moved" };
            (format!("module {module_id} {note}"), Route::AdminModules { course_id })
        }
        AdminAction::ModuleDown {
            course_id,
            module_id,
        } => {
            let moved = catalog.move_module_down(actor, &course_id, &module_id).await?;
            let note = if moved { "moved down" } else { "not moved" };
            (format!("module {module_id} {note}"), Route::AdminModules { course_id })
        }
        AdminAction::AddUser {
            name,
            email,
            password,
            role,
        } => {
            let draft = UserAccountDraft {
                name,
                email,
                password,
                role,
            };
            let user = catalog.create_user(actor, draft).await?;
            (format!("user {} created", user.id), Route::AdminUsers)
        }
        AdminAction::RemoveUser { user_id } => {
            let removed = catalog.delete_user(actor, &user_id).await?;
            let note = if removed { "deleted" } else { "not found" };
            (format!("user {user_id} {note}"), Route::AdminUsers)
        }
    };

    println!("{note}");
    print!("{}", pages::render(&page, app).await?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    logging::init_logging(&args.log_level);

    if args.command == Command::Help {
        print_usage();
        return Ok(());
    }

    prepare_sqlite_file(&args.db_url)?;
    let mut app = AppServices::new_sqlite(&args.db_url, Clock::default_clock()).await?;
    tracing::debug!(db = %args.db_url, command = ?args.command, "services ready");

    match args.command {
        Command::WhoAmI => show_actor(&app),
        Command::Login { email, password } => {
            if !app.gate_mut().login(&email, &password).await? {
                return Err(LoginRejected.into());
            }
            show_actor(&app);
            println!("-> {}", app.gate().landing());
        }
        Command::Logout => {
            app.gate_mut().logout().await?;
            println!("signed out");
        }
        Command::Register {
            name,
            email,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                name,
                email,
                password,
                confirm_password,
            }
            .validate()?;
            app.gate_mut()
                .register(&form.name, &form.email, &form.password)
                .await?;
            show_actor(&app);
            println!("-> {}", app.gate().landing());
        }
        Command::Open { path } => open(&app, Route::from_path(&path)).await?,
        Command::Study { course_id, steps } => study(&app, course_id, steps).await?,
        Command::Admin(action) => admin(&app, action).await?,
        Command::Help => print_usage(),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
