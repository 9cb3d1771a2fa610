mod catalog;
mod course;
mod ids;
mod lesson;
mod module;
mod session;

pub use ids::{CourseId, LessonId, ModuleId, ParseIdError, UserId};

pub use catalog::{
    AccountStatus, CatalogError, CourseListing, CourseListingDraft, ModuleListing,
    ModuleListingDraft, PublishStatus, Role, UserAccount, UserAccountDraft,
};
pub use course::{progress_percent, CompletionStep, Course, CourseError, LessonCompletion};
pub use lesson::{Lesson, LessonError};
pub use module::{Module, ModuleDraft, ModuleError, ModuleState};
pub use session::SessionRecord;
