//! Demo catalog shipped with the portal.
//!
//! Progress flags in the course tree simulate a returning learner: the first
//! module is finished and the second one is under way. They are seed data, not
//! something the progress engine derives.

use academy_core::model::{
    AccountStatus, CourseError, CourseId, CourseListing, Course, Lesson, LessonError, LessonId,
    Module, ModuleDraft, ModuleError, ModuleId, ModuleListing, PublishStatus, Role, UserAccount,
    UserId,
};
use chrono::{DateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeedError {
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error("invalid seed timestamp: {0}")]
    Timestamp(String),
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Result<DateTime<Utc>, SeedError> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .ok_or_else(|| SeedError::Timestamp(format!("{y}-{mo:02}-{d:02}T{h:02}:{mi:02}")))
}

struct ModuleSeed {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    duration: &'static str,
    locked: bool,
    lessons: &'static [(&'static str, &'static str, &'static str, bool)],
}

impl ModuleSeed {
    fn build(&self) -> Result<Module, SeedError> {
        let lessons = self
            .lessons
            .iter()
            .map(|&(id, title, duration, done)| {
                Lesson::new(LessonId::new(id), title, duration, done)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let completed = !lessons.is_empty() && lessons.iter().all(Lesson::is_completed);

        Ok(ModuleDraft {
            id: ModuleId::new(self.id),
            title: self.title.to_owned(),
            description: self.description.to_owned(),
            duration: self.duration.to_owned(),
            locked: self.locked,
            completed,
            lessons,
        }
        .validate()?)
    }
}

const TAXI_MODULES: [ModuleSeed; 4] = [
    ModuleSeed {
        id: "m1",
        title: "Einführung in die Taxi- und Mietwagenbranche",
        description: "Marktanalyse, aktuelle Trends und grundlegende Brancheninformationen.",
        duration: "4 Stunden",
        locked: false,
        lessons: &[
            ("l1", "Überblick über die Branche", "45 Min", true),
            ("l2", "Aktuelle Markttrends", "60 Min", true),
            ("l3", "Zukunftsaussichten", "45 Min", true),
        ],
    },
    ModuleSeed {
        id: "m2",
        title: "Gesetzliche Grundlagen",
        description:
            "Rechte & Pflichten eines Unternehmers, Verkehrsvorschriften und Arbeitsrecht.",
        duration: "8 Stunden",
        locked: false,
        lessons: &[
            ("l4", "Rechtlicher Rahmen", "90 Min", true),
            ("l5", "Pflichten als Unternehmer", "60 Min", false),
            ("l6", "Arbeitsrecht Grundlagen", "75 Min", false),
        ],
    },
    ModuleSeed {
        id: "m3",
        title: "Betriebswirtschaftliche Kenntnisse",
        description: "Unternehmensplanung, Finanzmanagement, Buchhaltung & Steuerrecht.",
        duration: "12 Stunden",
        locked: true,
        lessons: &[
            ("l7", "Geschäftsplanung", "90 Min", false),
            ("l8", "Buchhaltung Grundlagen", "120 Min", false),
            ("l9", "Steuerrecht für Taxi-Unternehmer", "90 Min", false),
        ],
    },
    ModuleSeed {
        id: "m4",
        title: "Marketingstrategien",
        description: "Kundengewinnung, Kundenbindung und effektives Marketing für Ihr Unternehmen.",
        duration: "10 Stunden",
        locked: true,
        lessons: &[
            ("l10", "Grundlagen des Marketings", "60 Min", false),
            ("l11", "Kundenakquise", "90 Min", false),
            ("l12", "Online Marketing", "120 Min", false),
        ],
    },
];

const TAXI_TITLE: &str = "Taxi- und Mietwagenunternehmer-Schein";
const TAXI_DESCRIPTION: &str =
    "Umfassender Kurs zur Vorbereitung auf die Prüfung zum Taxi- und Mietwagenunternehmer.";
const ADVANCED_TITLE: &str = "Aufbaukurs: Betriebswirtschaft für Taxiunternehmer";
const ADVANCED_DESCRIPTION: &str =
    "Vertiefte Einblicke in die betriebswirtschaftlichen Aspekte eines Taxiunternehmens.";

/// Learner-facing course trees.
///
/// # Errors
///
/// Returns `SeedError` if the seed violates a module or course rule.
pub fn course_trees() -> Result<Vec<Course>, SeedError> {
    let modules = TAXI_MODULES
        .iter()
        .map(ModuleSeed::build)
        .collect::<Result<Vec<_>, _>>()?;
    let course = Course::new(CourseId::new("1"), TAXI_TITLE, TAXI_DESCRIPTION, modules)?;
    Ok(vec![course])
}

/// Admin course table.
///
/// # Errors
///
/// Returns `SeedError::Timestamp` if a creation date cannot be built.
pub fn course_listings() -> Result<Vec<CourseListing>, SeedError> {
    Ok(vec![
        CourseListing {
            id: CourseId::new("1"),
            title: TAXI_TITLE.into(),
            description: TAXI_DESCRIPTION.into(),
            module_count: 4,
            status: PublishStatus::Published,
            enrollments: 48,
            price_eur: 499,
            created_at: at(2023, 5, 10, 10, 30)?,
        },
        CourseListing {
            id: CourseId::new("2"),
            title: ADVANCED_TITLE.into(),
            description: ADVANCED_DESCRIPTION.into(),
            module_count: 3,
            status: PublishStatus::Draft,
            enrollments: 0,
            price_eur: 299,
            created_at: at(2023, 9, 15, 14, 20)?,
        },
    ])
}

fn module_row(
    id: &str,
    title: &str,
    description: &str,
    order: u32,
    duration: &str,
    lesson_count: u32,
    status: PublishStatus,
) -> ModuleListing {
    ModuleListing {
        id: ModuleId::new(id),
        title: title.into(),
        description: description.into(),
        order,
        duration: duration.into(),
        lesson_count,
        status,
    }
}

/// Admin module tables, keyed by course.
#[must_use]
pub fn module_listings() -> Vec<(CourseId, Vec<ModuleListing>)> {
    use PublishStatus::{Draft, Published};

    let taxi = TAXI_MODULES
        .iter()
        .zip(1_u32..)
        .map(|(seed, order)| {
            let status = if order <= 2 { Published } else { Draft };
            let lessons = u32::try_from(seed.lessons.len()).unwrap_or(u32::MAX);
            module_row(seed.id, seed.title, seed.description, order, seed.duration, lessons, status)
        })
        .collect();

    let advanced = vec![
        module_row(
            "m5",
            "Fortgeschrittene Finanzplanung",
            "Vertiefung des Finanzwissens und der Buchhaltungspraktiken.",
            1,
            "6 Stunden",
            2,
            Published,
        ),
        module_row(
            "m6",
            "Personalmanagement",
            "Effektive Verwaltung von Mitarbeitern und Fahrern.",
            2,
            "5 Stunden",
            2,
            Draft,
        ),
        module_row(
            "m7",
            "Optimierung des Geschäftsmodells",
            "Strategien zur Verbesserung der Betriebseffizienz und Gewinnmaximierung.",
            3,
            "7 Stunden",
            3,
            Draft,
        ),
    ];

    vec![(CourseId::new("1"), taxi), (CourseId::new("2"), advanced)]
}

/// Admin user table.
///
/// # Errors
///
/// Returns `SeedError::Timestamp` if a creation date cannot be built.
pub fn user_accounts() -> Result<Vec<UserAccount>, SeedError> {
    let user = |id: &str, name: &str, email: &str, role, status, courses, created_at| UserAccount {
        id: UserId::new(id),
        name: name.into(),
        email: email.into(),
        role,
        status,
        enrolled_courses: courses,
        created_at,
    };

    Ok(vec![
        user(
            "1",
            "Max Mustermann",
            "max@example.com",
            Role::User,
            AccountStatus::Active,
            1,
            at(2023, 5, 10, 10, 30)?,
        ),
        user(
            "2",
            "Anna Schmidt",
            "anna@example.com",
            Role::User,
            AccountStatus::Active,
            2,
            at(2023, 6, 15, 14, 20)?,
        ),
        user(
            "3",
            "Thomas Weber",
            "thomas@example.com",
            Role::User,
            AccountStatus::Inactive,
            0,
            at(2023, 7, 22, 9, 45)?,
        ),
        user(
            "admin1",
            "Admin User",
            "admin@tum-academy.de",
            Role::Admin,
            AccountStatus::Active,
            2,
            at(2023, 1, 5, 8, 30)?,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::ModuleState;

    #[test]
    fn taxi_course_seed_is_consistent() {
        let courses = course_trees().unwrap();
        let taxi = &courses[0];
        let states: Vec<_> = taxi.modules().iter().map(Module::state).collect();
        assert_eq!(
            states,
            vec![
                ModuleState::Completed,
                ModuleState::InProgress,
                ModuleState::Locked,
                ModuleState::Locked
            ]
        );
        assert_eq!(taxi.total_lessons(), 12);
        assert_eq!(taxi.completed_lessons(), 4);
        assert_eq!(taxi.progress_percent(), 33);
    }

    #[test]
    fn module_tables_are_ordered() {
        for (_, rows) in module_listings() {
            let orders: Vec<u32> = rows.iter().map(|r| r.order).collect();
            let mut sorted = orders.clone();
            sorted.sort_unstable();
            assert_eq!(orders, sorted);
        }
    }

    #[test]
    fn users_include_the_demo_admin() {
        let users = user_accounts().unwrap();
        assert_eq!(users.len(), 4);
        assert!(users.iter().any(|u| u.role == Role::Admin && u.email == "admin@tum-academy.de"));
    }
}
