use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Lesson, LessonId, ModuleId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module id cannot be empty")]
    BlankId,

    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("module {0} cannot be locked and completed at the same time")]
    LockedAndCompleted(ModuleId),

    #[error("module {id} is marked completed but has {open} open lessons")]
    CompletedWithOpenLessons { id: ModuleId, open: usize },

    #[error("module {0} has every lesson completed but is not marked completed")]
    CompletionNotRecorded(ModuleId),

    #[error("module {module} contains lesson {lesson} more than once")]
    DuplicateLesson { module: ModuleId, lesson: LessonId },
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

/// Where a module sits in the unlock progression.
///
/// `Locked -> InProgress -> Completed`; no transition ever goes backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Locked,
    InProgress,
    Completed,
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Unvalidated module as it appears in seed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDraft {
    pub id: ModuleId,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub locked: bool,
    pub completed: bool,
    pub lessons: Vec<Lesson>,
}

impl ModuleDraft {
    /// Check the seed flags against the lessons and build a `Module`.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` when the id/title are blank, when the module is both
    /// locked and completed, when `completed` disagrees with the lesson set, or when
    /// a lesson id repeats.
    pub fn validate(self) -> Result<Module, ModuleError> {
        if self.id.is_blank() {
            return Err(ModuleError::BlankId);
        }
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ModuleError::EmptyTitle);
        }
        if self.locked && self.completed {
            return Err(ModuleError::LockedAndCompleted(self.id));
        }

        let mut seen = HashSet::new();
        for lesson in &self.lessons {
            if !seen.insert(lesson.id()) {
                return Err(ModuleError::DuplicateLesson {
                    module: self.id.clone(),
                    lesson: lesson.id().clone(),
                });
            }
        }

        let open = self.lessons.iter().filter(|l| !l.is_completed()).count();
        if self.completed && open > 0 {
            return Err(ModuleError::CompletedWithOpenLessons { id: self.id, open });
        }
        // Empty modules have no lesson evidence either way; the seed flag stands.
        if !self.completed && open == 0 && !self.lessons.is_empty() {
            return Err(ModuleError::CompletionNotRecorded(self.id));
        }

        Ok(Module {
            id: self.id,
            title,
            description: self.description.trim().to_owned(),
            duration: self.duration.trim().to_owned(),
            locked: self.locked,
            completed: self.completed,
            lessons: self.lessons,
        })
    }
}

//
// ─── MODULE ───────────────────────────────────────────────────────────────────
//

/// An ordered group of lessons with derived completion and a monotonic lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    description: String,
    duration: String,
    locked: bool,
    completed: bool,
    lessons: Vec<Lesson>,
}

impl Module {
    #[must_use]
    pub fn id(&self) -> &ModuleId {
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
    pub fn duration(&self) -> &str {
        &self.duration
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }

    #[must_use]
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.is_completed()).count()
    }

    #[must_use]
    pub fn state(&self) -> ModuleState {
        if self.locked {
            ModuleState::Locked
        } else if self.completed {
            ModuleState::Completed
        } else {
            ModuleState::InProgress
        }
    }

    /// First lesson that still needs work, in sequence order.
    #[must_use]
    pub fn next_open_lesson(&self) -> Option<&Lesson> {
        self.lessons.iter().find(|l| !l.is_completed())
    }

    pub(crate) fn lesson_mut(&mut self, id: &LessonId) -> Option<&mut Lesson> {
        self.lessons.iter_mut().find(|l| l.id() == id)
    }

    /// Recompute `completed` from the lessons. Returns `true` on the
    /// `InProgress -> Completed` edge only.
    pub(crate) fn refresh_completed(&mut self) -> bool {
        if self.completed || self.lessons.is_empty() {
            return false;
        }
        self.completed = self.lessons.iter().all(Lesson::is_completed);
        self.completed
    }

    /// Release the lock. Returns `true` if the module was locked before.
    pub(crate) fn unlock(&mut self) -> bool {
        std::mem::replace(&mut self.locked, false)
    }
}
