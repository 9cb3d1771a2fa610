use std::sync::Arc;

use academy_core::model::{Course, CourseId, LessonCompletion, LessonId, ModuleId, ModuleState};
use academy_core::CourseProgress;
use storage::repository::CourseRepository;

use crate::error::CourseServiceError;

/// One row of the dashboard's module list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    pub id: ModuleId,
    pub title: String,
    pub state: ModuleState,
}

impl ModuleSummary {
    #[must_use]
    pub fn completed(&self) -> bool {
        self.state == ModuleState::Completed
    }
}

/// The lesson a learner should pick up next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextLesson {
    pub module_id: ModuleId,
    pub module_title: String,
    pub lesson_id: LessonId,
    pub lesson_title: String,
    pub duration: String,
}

/// Entries shown in the dashboard's activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 3;

/// Something the learner finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activity {
    Lesson { title: String, module_title: String },
    Module { title: String },
}

/// Finished lessons and modules, newest first.
///
/// The tree keeps no completion times, so sequence order stands in for them.
fn recent_activity(course: &Course) -> Vec<Activity> {
    let mut feed = Vec::new();
    for module in course.modules() {
        for lesson in module.lessons().iter().filter(|l| l.is_completed()) {
            feed.push(Activity::Lesson {
                title: lesson.title().to_owned(),
                module_title: module.title().to_owned(),
            });
        }
        if module.is_completed() {
            feed.push(Activity::Module {
                title: module.title().to_owned(),
            });
        }
    }
    feed.into_iter().rev().take(RECENT_ACTIVITY_LIMIT).collect()
}

/// Dashboard card for an enrolled course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSummary {
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub progress: u8,
    pub completed: bool,
    pub modules: Vec<ModuleSummary>,
    pub next_lesson: Option<NextLesson>,
    pub recent_activity: Vec<Activity>,
}

impl EnrollmentSummary {
    #[must_use]
    pub fn from_progress(view: &CourseProgress) -> Self {
        let course = view.course();
        let modules = course
            .modules()
            .iter()
            .map(|m| ModuleSummary {
                id: m.id().clone(),
                title: m.title().to_owned(),
                state: m.state(),
            })
            .collect();

        let next_lesson = course
            .modules()
            .iter()
            .find(|m| m.state() == ModuleState::InProgress)
            .and_then(|m| {
                m.next_open_lesson().map(|lesson| NextLesson {
                    module_id: m.id().clone(),
                    module_title: m.title().to_owned(),
                    lesson_id: lesson.id().clone(),
                    lesson_title: lesson.title().to_owned(),
                    duration: lesson.duration().to_owned(),
                })
            });

        Self {
            course_id: course.id().clone(),
            title: course.title().to_owned(),
            description: course.description().to_owned(),
            progress: view.overall_progress(),
            completed: view.is_completed(),
            modules,
            next_lesson,
            recent_activity: recent_activity(course),
        }
    }
}

/// Loads course trees for the learner views.
///
/// Each load hands out a fresh copy, so progress made in one view is not
/// shared with another.
#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
}

impl CourseService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// Open a course in the progress view.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::NotFound` for an unknown id.
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn open_course(
        &self,
        course_id: &CourseId,
    ) -> Result<CourseProgress, CourseServiceError> {
        let course = self
            .courses
            .get_course(course_id)
            .await?
            .ok_or_else(|| CourseServiceError::NotFound(course_id.clone()))?;
        tracing::debug!(course = %course_id, progress = course.progress_percent(), "course opened");
        Ok(CourseProgress::new(course))
    }

    /// Dashboard card for one course.
    ///
    /// # Errors
    ///
    /// Same as [`CourseService::open_course`].
    pub async fn enrollment(
        &self,
        course_id: &CourseId,
    ) -> Result<EnrollmentSummary, CourseServiceError> {
        let view = self.open_course(course_id).await?;
        Ok(EnrollmentSummary::from_progress(&view))
    }

    /// Dashboard cards for every course; every learner is enrolled in all of them.
    ///
    /// # Errors
    ///
    /// Returns `CourseServiceError::Storage` if repository access fails.
    pub async fn enrollments(&self) -> Result<Vec<EnrollmentSummary>, CourseServiceError> {
        let courses = self.courses.list_courses().await?;
        Ok(courses
            .into_iter()
            .map(|course| EnrollmentSummary::from_progress(&CourseProgress::new(course)))
            .collect())
    }

    /// Mark a lesson done in an open view and log what happened.
    pub fn complete_lesson(
        &self,
        view: &mut CourseProgress,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> LessonCompletion {
        let outcome = view.complete_lesson(module_id, lesson_id);
        let course = view.course().id();
        match &outcome {
            LessonCompletion::Completed(step) => {
                tracing::info!(
                    %course,
                    module = %step.module_id,
                    lesson = %step.lesson_id,
                    progress = view.overall_progress(),
                    "lesson completed"
                );
                if step.module_completed {
                    tracing::info!(%course, module = %step.module_id, "module completed");
                }
                if let Some(next) = &step.unlocked {
                    tracing::info!(%course, module = %next, "module unlocked");
                }
            }
            ignored => {
                tracing::debug!(
                    %course,
                    module = %module_id,
                    lesson = %lesson_id,
                    outcome = ?ignored,
                    "lesson completion ignored"
                );
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn service() -> CourseService {
        CourseService::new(Arc::new(InMemoryRepository::with_fixtures().unwrap()))
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let err = service().open_course(&CourseId::new("99")).await.unwrap_err();
        assert!(matches!(err, CourseServiceError::NotFound(id) if id.as_str() == "99"));
    }

    #[tokio::test]
    async fn enrollment_points_at_the_next_open_lesson() {
        let summary = service().enrollment(&CourseId::new("1")).await.unwrap();
        assert_eq!(summary.progress, 33);
        assert!(!summary.completed);

        let done: Vec<bool> = summary.modules.iter().map(ModuleSummary::completed).collect();
        assert_eq!(done, vec![true, false, false, false]);

        let next = summary.next_lesson.unwrap();
        assert_eq!(next.module_id, ModuleId::new("m2"));
        assert_eq!(next.lesson_id, LessonId::new("l5"));
        assert_eq!(next.duration, "60 Min");

        assert_eq!(
            summary.recent_activity,
            vec![
                Activity::Lesson {
                    title: "Rechtlicher Rahmen".into(),
                    module_title: "Gesetzliche Grundlagen".into(),
                },
                Activity::Module {
                    title: "Einführung in die Taxi- und Mietwagenbranche".into(),
                },
                Activity::Lesson {
                    title: "Zukunftsaussichten".into(),
                    module_title: "Einführung in die Taxi- und Mietwagenbranche".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn every_open_gets_a_fresh_copy() {
        let service = service();
        let id = CourseId::new("1");
        let mut view = service.open_course(&id).await.unwrap();
        let (m2, l5) = (ModuleId::new("m2"), LessonId::new("l5"));
        let outcome = service.complete_lesson(&mut view, &m2, &l5);
        assert!(outcome.changed());
        assert_eq!(view.overall_progress(), 42);

        let again = service.open_course(&id).await.unwrap();
        assert_eq!(again.overall_progress(), 33);
    }

    #[tokio::test]
    async fn enrollments_cover_every_course() {
        let cards = service().enrollments().await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].course_id, CourseId::new("1"));
    }
}
