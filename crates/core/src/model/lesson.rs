use thiserror::Error;

use crate::model::LessonId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be empty")]
    BlankId,

    #[error("lesson title cannot be empty")]
    EmptyTitle,
}

/// A single unit of study. Completion is monotonic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    duration: String,
    completed: bool,
}

impl Lesson {
    /// Create a lesson, trimming the title and duration label.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::BlankId` or `LessonError::EmptyTitle` for blank input.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        duration: impl Into<String>,
        completed: bool,
    ) -> Result<Self, LessonError> {
        if id.is_blank() {
            return Err(LessonError::BlankId);
        }
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            title,
            duration: duration.into().trim().to_owned(),
            completed,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Display label such as `45 Min`.
    #[must_use]
    pub fn duration(&self) -> &str {
        &self.duration
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Mark the lesson done. Returns `true` only on the first call.
    pub(crate) fn mark_completed(&mut self) -> bool {
        let newly = !self.completed;
        self.completed = true;
        newly
    }
}
