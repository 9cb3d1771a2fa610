use std::collections::HashSet;

use thiserror::Error;

use crate::model::{CourseId, LessonId, Module, ModuleId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course id cannot be empty")]
    BlankId,

    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course contains module {0} more than once")]
    DuplicateModule(ModuleId),
}

/// What a single `complete_lesson` call changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonCompletion {
    /// No module with that id; nothing changed.
    UnknownModule,
    /// The module exists but has no such lesson; nothing changed.
    UnknownLesson,
    /// The module is still locked; its lessons cannot be worked on yet.
    ModuleLocked,
    /// The lesson was already done; nothing changed.
    AlreadyCompleted,
    /// The lesson moved to completed.
    Completed(CompletionStep),
}

/// Transition record for a lesson that was newly completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionStep {
    pub module_id: ModuleId,
    pub lesson_id: LessonId,
    /// The owning module reached `Completed` with this lesson.
    pub module_completed: bool,
    /// The module that was unlocked as a consequence, if any.
    pub unlocked: Option<ModuleId>,
}

impl LessonCompletion {
    /// True when the call mutated the course.
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// A course and its ordered module tree.
///
/// Module order is both display order and unlock order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    modules: Vec<Module>,
}

impl Course {
    /// Assemble a course from validated modules.
    ///
    /// The first module is always unlocked, and so is any module whose predecessor
    /// is already completed in the seed. Nothing is ever locked here.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` for a blank id/title or repeated module ids.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        description: impl Into<String>,
        mut modules: Vec<Module>,
    ) -> Result<Self, CourseError> {
        if id.is_blank() {
            return Err(CourseError::BlankId);
        }
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }

        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.id().clone()) {
                return Err(CourseError::DuplicateModule(module.id().clone()));
            }
        }

        if let Some(first) = modules.first_mut() {
            first.unlock();
        }
        for idx in 1..modules.len() {
            if modules[idx - 1].is_completed() {
                modules[idx].unlock();
            }
        }

        Ok(Self {
            id,
            title,
            description: description.into().trim().to_owned(),
            modules,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<&Module> {
        self.modules.iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons().len()).sum()
    }

    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.modules.iter().map(Module::completed_lessons).sum()
    }

    /// Share of completed lessons across all modules, as a whole percentage.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.completed_lessons(), self.total_lessons())
    }

    /// Every module completed. A course without modules is never complete.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.modules.is_empty() && self.modules.iter().all(Module::is_completed)
    }

    /// Mark a lesson complete and run the unlock progression.
    ///
    /// Unknown ids and locked modules are no-ops; repeating a call is a no-op.
    pub fn complete_lesson(
        &mut self,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> LessonCompletion {
        let Some(idx) = self.modules.iter().position(|m| m.id() == module_id) else {
            return LessonCompletion::UnknownModule;
        };
        let module = &mut self.modules[idx];
        if module.is_locked() {
            return LessonCompletion::ModuleLocked;
        }
        let Some(lesson) = module.lesson_mut(lesson_id) else {
            return LessonCompletion::UnknownLesson;
        };
        if !lesson.mark_completed() {
            return LessonCompletion::AlreadyCompleted;
        }

        let module_completed = module.refresh_completed();
        let unlocked = if module_completed {
            self.modules
                .get_mut(idx + 1)
                .filter(|next| next.is_locked())
                .map(|next| {
                    next.unlock();
                    next.id().clone()
                })
        } else {
            None
        };

        LessonCompletion::Completed(CompletionStep {
            module_id: module_id.clone(),
            lesson_id: lesson_id.clone(),
            module_completed,
            unlocked,
        })
    }
}

/// `round(100 * completed / total)` with halves rounding up; `0` when `total == 0`.
#[must_use]
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    let pct = (200 * completed + total) / (2 * total);
    u8::try_from(pct).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lesson, ModuleDraft, ModuleState};

    fn module(id: &str, locked: bool, lessons: &[(&str, bool)]) -> Module {
        let lessons: Vec<Lesson> = lessons
            .iter()
            .map(|(lid, done)| Lesson::new(LessonId::new(*lid), "Lesson", "60 Min", *done).unwrap())
            .collect();
        let completed = !lessons.is_empty() && lessons.iter().all(Lesson::is_completed);
        ModuleDraft {
            id: ModuleId::new(id),
            title: format!("Module {id}"),
            description: String::new(),
            duration: "1 Stunde".into(),
            locked,
            completed,
            lessons,
        }
        .validate()
        .unwrap()
    }

    fn three_modules() -> Course {
        Course::new(
            CourseId::new("c1"),
            "Course",
            "",
            vec![
                module("m1", false, &[("l1", false), ("l2", false)]),
                module("m2", true, &[("l3", false)]),
                module("m3", true, &[("l4", false)]),
            ],
        )
        .unwrap()
    }

    fn assert_invariants(course: &Course) {
        for m in course.modules() {
            if m.is_completed() {
                assert!(m.lessons().iter().all(Lesson::is_completed));
                assert!(!m.is_locked());
            }
        }
    }

    #[test]
    fn progress_rounds_half_up() {
        assert_eq!(progress_percent(2, 6), 33);
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(12, 12), 100);
    }

    #[test]
    fn zero_lessons_is_zero_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        let course = Course::new(CourseId::new("c"), "Empty", "", vec![]).unwrap();
        assert_eq!(course.progress_percent(), 0);
        assert!(!course.is_completed());
    }

    #[test]
    fn first_module_unlocked_regardless_of_seed() {
        let course = Course::new(
            CourseId::new("c1"),
            "Course",
            "",
            vec![module("m1", true, &[("l1", false)]), module("m2", true, &[("l2", false)])],
        )
        .unwrap();
        assert!(!course.modules()[0].is_locked());
        assert!(course.modules()[1].is_locked());
    }

    #[test]
    fn completed_seed_module_unlocks_successor() {
        let course = Course::new(
            CourseId::new("c1"),
            "Course",
            "",
            vec![module("m1", false, &[("l1", true)]), module("m2", true, &[("l2", false)])],
        )
        .unwrap();
        assert_eq!(course.modules()[1].state(), ModuleState::InProgress);
    }

    #[test]
    fn rejects_duplicate_modules() {
        let err = Course::new(
            CourseId::new("c1"),
            "Course",
            "",
            vec![module("m1", false, &[]), module("m1", false, &[])],
        )
        .unwrap_err();
        assert_eq!(err, CourseError::DuplicateModule(ModuleId::new("m1")));
    }

    #[test]
    fn finishing_module_unlocks_only_the_next_one() {
        let mut course = three_modules();
        let m1 = ModuleId::new("m1");

        let first = course.complete_lesson(&m1, &LessonId::new("l1"));
        assert!(matches!(
            first,
            LessonCompletion::Completed(CompletionStep {
                module_completed: false,
                unlocked: None,
                ..
            })
        ));
        assert_invariants(&course);

        let second = course.complete_lesson(&m1, &LessonId::new("l2"));
        assert_eq!(
            second,
            LessonCompletion::Completed(CompletionStep {
                module_id: m1.clone(),
                lesson_id: LessonId::new("l2"),
                module_completed: true,
                unlocked: Some(ModuleId::new("m2")),
            })
        );
        assert_invariants(&course);
        assert!(!course.modules()[1].is_locked());
        assert!(course.modules()[2].is_locked());
    }

    #[test]
    fn completing_twice_equals_once() {
        let mut once = three_modules();
        once.complete_lesson(&ModuleId::new("m1"), &LessonId::new("l1"));

        let mut twice = three_modules();
        twice.complete_lesson(&ModuleId::new("m1"), &LessonId::new("l1"));
        let again = twice.complete_lesson(&ModuleId::new("m1"), &LessonId::new("l1"));

        assert_eq!(again, LessonCompletion::AlreadyCompleted);
        assert_eq!(once, twice);
    }

    #[test]
    fn unknown_ids_and_locked_modules_are_noops() {
        let mut course = three_modules();
        let before = course.clone();

        assert_eq!(
            course.complete_lesson(&ModuleId::new("nope"), &LessonId::new("l1")),
            LessonCompletion::UnknownModule
        );
        assert_eq!(
            course.complete_lesson(&ModuleId::new("m1"), &LessonId::new("l3")),
            LessonCompletion::UnknownLesson
        );
        assert_eq!(
            course.complete_lesson(&ModuleId::new("m2"), &LessonId::new("l3")),
            LessonCompletion::ModuleLocked
        );
        assert_eq!(course, before);
    }

    #[test]
    fn last_module_completion_completes_course() {
        let mut course = three_modules();
        for (m, l) in [("m1", "l1"), ("m1", "l2"), ("m2", "l3"), ("m3", "l4")] {
            assert!(course.complete_lesson(&ModuleId::new(m), &LessonId::new(l)).changed());
            assert_invariants(&course);
        }
        assert!(course.is_completed());
        assert_eq!(course.progress_percent(), 100);
    }
}
