use std::fmt;

use academy_core::model::{CourseId, LessonId, ModuleId, Role, UserId};

pub const DEFAULT_DB_URL: &str = "sqlite://academy.sqlite3";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingOperand { command: &'static str, operand: &'static str },
    InvalidDbUrl { raw: String },
    InvalidStep { raw: String },
    InvalidRole { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingOperand { command, operand } => {
                write!(f, "{command} requires <{operand}>")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidStep { raw } => {
                write!(f, "invalid lesson step {raw:?}, expected <module-id>:<lesson-id>")
            }
            ArgsError::InvalidRole { raw } => {
                write!(f, "invalid role {raw:?}, expected user or admin")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    WhoAmI,
    Login {
        email: String,
        password: String,
    },
    Logout,
    Register {
        name: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    Open {
        path: String,
    },
    Study {
        course_id: CourseId,
        steps: Vec<(ModuleId, LessonId)>,
    },
    Admin(AdminAction),
    Help,
}

/// Catalog edits run by `admin ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    AddCourse {
        title: String,
        description: String,
        price: String,
    },
    RemoveCourse {
        course_id: CourseId,
    },
    AddModule {
        course_id: CourseId,
        title: String,
        description: String,
        duration: String,
    },
    RemoveModule {
        course_id: CourseId,
        module_id: ModuleId,
    },
    ModuleUp {
        course_id: CourseId,
        module_id: ModuleId,
    },
    ModuleDown {
        course_id: CourseId,
        module_id: ModuleId,
    },
    AddUser {
        name: String,
        email: String,
        password: String,
        role: Role,
    },
    RemoveUser {
        user_id: UserId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub log_level: String,
    pub command: Command,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--db <sqlite_url>] [--log <level>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  whoami                                      show the signed-in actor");
    eprintln!("  login <email> <password>                    sign in with a demo account");
    eprintln!("  logout                                      sign out");
    eprintln!("  register <name> <email> <password> <confirm>");
    eprintln!("  open <path>                                 render a page, e.g. /dashboard");
    eprintln!("  study <course-id> <module-id>:<lesson-id>...");
    eprintln!("  admin course add <title> <description> <price>");
    eprintln!("  admin course rm <course-id>");
    eprintln!("  admin module add <course-id> <title> <description> <duration>");
    eprintln!("  admin module rm|up|down <course-id> <module-id>");
    eprintln!("  admin user add <name> <email> <password> [user|admin]");
    eprintln!("  admin user rm <user-id>");
    eprintln!("  help");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --log {DEFAULT_LOG_LEVEL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ACADEMY_DB_URL, ACADEMY_LOG, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn operand(
    rest: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String, ArgsError> {
    rest.next().ok_or(ArgsError::MissingOperand {
        command,
        operand: name,
    })
}

fn parse_step(raw: String) -> Result<(ModuleId, LessonId), ArgsError> {
    let parsed: Option<(ModuleId, LessonId)> = raw
        .split_once(':')
        .and_then(|(module, lesson)| Some((module.parse().ok()?, lesson.parse().ok()?)));
    parsed.ok_or(ArgsError::InvalidStep { raw })
}

fn parse_role(raw: String) -> Result<Role, ArgsError> {
    match raw.trim().to_lowercase().as_str() {
        "user" => Ok(Role::User),
        "admin" => Ok(Role::Admin),
        _ => Err(ArgsError::InvalidRole { raw }),
    }
}

impl AdminAction {
    fn parse(rest: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let table = operand(rest, "admin", "course|module|user")?;
        let verb = operand(rest, "admin", "action")?;

        let action = match (table.as_str(), verb.as_str()) {
            ("course", "add") => Self::AddCourse {
                title: operand(rest, "admin course add", "title")?,
                description: operand(rest, "admin course add", "description")?,
                price: operand(rest, "admin course add", "price")?,
            },
            ("course", "rm") => Self::RemoveCourse {
                course_id: CourseId::new(operand(rest, "admin course rm", "course-id")?),
            },
            ("module", "add") => Self::AddModule {
                course_id: CourseId::new(operand(rest, "admin module add", "course-id")?),
                title: operand(rest, "admin module add", "title")?,
                description: operand(rest, "admin module add", "description")?,
                duration: operand(rest, "admin module add", "duration")?,
            },
            ("module", "rm" | "up" | "down") => {
                let course_id = CourseId::new(operand(rest, "admin module", "course-id")?);
                let module_id = ModuleId::new(operand(rest, "admin module", "module-id")?);
                match verb.as_str() {
                    "rm" => Self::RemoveModule {
                        course_id,
                        module_id,
                    },
                    "up" => Self::ModuleUp {
                        course_id,
                        module_id,
                    },
                    _ => Self::ModuleDown {
                        course_id,
                        module_id,
                    },
                }
            }
            ("user", "add") => Self::AddUser {
                name: operand(rest, "admin user add", "name")?,
                email: operand(rest, "admin user add", "email")?,
                password: operand(rest, "admin user add", "password")?,
                role: rest.next().map_or(Ok(Role::User), parse_role)?,
            },
            ("user", "rm") => Self::RemoveUser {
                user_id: UserId::new(operand(rest, "admin user rm", "user-id")?),
            },
            _ => return Err(ArgsError::UnknownCommand(format!("admin {table} {verb}"))),
        };
        Ok(action)
    }
}

impl Command {
    fn parse(positionals: Vec<String>) -> Result<Self, ArgsError> {
        let mut rest = positionals.into_iter();
        let Some(name) = rest.next() else {
            return Ok(Self::Help);
        };

        let command = match name.as_str() {
            "whoami" => Self::WhoAmI,
            "login" => Self::Login {
                email: operand(&mut rest, "login", "email")?,
                password: operand(&mut rest, "login", "password")?,
            },
            "logout" => Self::Logout,
            "register" => Self::Register {
                name: operand(&mut rest, "register", "name")?,
                email: operand(&mut rest, "register", "email")?,
                password: operand(&mut rest, "register", "password")?,
                confirm_password: operand(&mut rest, "register", "confirm")?,
            },
            "open" => Self::Open {
                path: operand(&mut rest, "open", "path")?,
            },
            "study" => {
                let course_id = operand(&mut rest, "study", "course-id")?;
                let steps = rest.by_ref().map(parse_step).collect::<Result<Vec<_>, _>>()?;
                Self::Study {
                    course_id: CourseId::new(course_id),
                    steps,
                }
            }
            "admin" => Self::Admin(AdminAction::parse(&mut rest)?),
            "help" => Self::Help,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        match rest.next() {
            Some(extra) => Err(ArgsError::UnknownArg(extra)),
            None => Ok(command),
        }
    }
}

impl Args {
    /// Parse flags and the subcommand; flags may appear anywhere.
    ///
    /// `env` supplies `ACADEMY_DB_URL` / `ACADEMY_LOG` fallbacks.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env("ACADEMY_DB_URL")
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut log_level = env("ACADEMY_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.into());
        let mut positionals = Vec::new();

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--log" => log_level = require_value(&mut args, "--log")?,
                "--help" | "-h" => positionals = vec!["help".into()],
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        Ok(Self {
            db_url,
            log_level,
            command: Command::parse(positionals)?,
        })
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:")
    {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}
