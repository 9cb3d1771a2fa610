//! Course progress engine: the learner's view of one course.
//!
//! Owns the course tree for the lifetime of a course view, tracks which module is
//! open, and keeps the aggregate progress percentage in step with the lesson set.

use crate::model::{Course, LessonCompletion, LessonId, Module, ModuleId};

/// Per-view progress state for a single course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgress {
    course: Course,
    active_module: Option<ModuleId>,
    overall_progress: u8,
}

impl CourseProgress {
    /// Open a course view. The first unlocked module becomes active.
    #[must_use]
    pub fn new(course: Course) -> Self {
        let active_module = course
            .modules()
            .iter()
            .find(|m| !m.is_locked())
            .map(|m| m.id().clone());
        let overall_progress = course.progress_percent();
        Self {
            course,
            active_module,
            overall_progress,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn into_course(self) -> Course {
        self.course
    }

    #[must_use]
    pub fn active_module_id(&self) -> Option<&ModuleId> {
        self.active_module.as_ref()
    }

    #[must_use]
    pub fn active_module(&self) -> Option<&Module> {
        self.active_module
            .as_ref()
            .and_then(|id| self.course.module(id))
    }

    /// Aggregate progress, cached for rendering.
    #[must_use]
    pub fn overall_progress(&self) -> u8 {
        self.overall_progress
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.course.is_completed()
    }

    /// Switch the open module. Locked or unknown modules are ignored.
    pub fn select_module(&mut self, module_id: &ModuleId) {
        if self
            .course
            .module(module_id)
            .is_some_and(|m| !m.is_locked())
        {
            self.active_module = Some(module_id.clone());
        }
    }

    /// Complete a lesson and refresh the cached progress.
    pub fn complete_lesson(
        &mut self,
        module_id: &ModuleId,
        lesson_id: &LessonId,
    ) -> LessonCompletion {
        let outcome = self.course.complete_lesson(module_id, lesson_id);
        self.overall_progress = self.course.progress_percent();
        outcome
    }
}
