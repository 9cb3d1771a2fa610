//! Admin console operations over the course, module and user tables.
//!
//! Every call takes the acting session and refuses to run unless it carries
//! the admin capability.

use std::sync::Arc;

use academy_core::access::{self, GuardDecision, Requirement};
use academy_core::model::{
    AccountStatus, CourseId, CourseListing, CourseListingDraft, ModuleId, ModuleListing,
    ModuleListingDraft, PublishStatus, SessionRecord, UserAccount, UserAccountDraft, UserId,
};
use academy_core::time::IdSequence;
use storage::repository::{CourseCatalogRepository, ModuleCatalogRepository, UserRepository};

use crate::error::CatalogServiceError;
use crate::Clock;

/// Figures for the admin dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOverview {
    pub total_courses: usize,
    pub published_courses: usize,
    pub active_users: usize,
    pub total_enrollments: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

fn require_admin(actor: Option<&SessionRecord>) -> Result<&SessionRecord, CatalogServiceError> {
    match (access::guard(actor, Requirement::Admin), actor) {
        (GuardDecision::Render, Some(session)) => Ok(session),
        _ => Err(CatalogServiceError::Forbidden),
    }
}

/// `count + 1`, bumped past ids that are already taken.
fn sequential_id(taken: &[&str], count: usize) -> String {
    let mut n = count + 1;
    while taken.contains(&n.to_string().as_str()) {
        n += 1;
    }
    n.to_string()
}

pub struct CatalogService {
    clock: Clock,
    courses: Arc<dyn CourseCatalogRepository>,
    modules: Arc<dyn ModuleCatalogRepository>,
    users: Arc<dyn UserRepository>,
    module_ids: IdSequence,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        clock: Clock,
        courses: Arc<dyn CourseCatalogRepository>,
        modules: Arc<dyn ModuleCatalogRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            clock,
            courses,
            modules,
            users,
            module_ids: IdSequence::new(),
        }
    }

    //
    // ─── COURSES ───────────────────────────────────────────────────────────────
    //

    /// Courses whose title or description contains `query` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list_courses(
        &self,
        actor: Option<&SessionRecord>,
        query: &str,
    ) -> Result<Vec<CourseListing>, CatalogServiceError> {
        require_admin(actor)?;
        let mut rows = self.courses.list_listings().await?;
        rows.retain(|row| row.matches(query));
        Ok(rows)
    }

    /// Add a course as an empty draft.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Catalog` if the draft is invalid.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn create_course(
        &self,
        actor: Option<&SessionRecord>,
        draft: CourseListingDraft,
    ) -> Result<CourseListing, CatalogServiceError> {
        let admin = require_admin(actor)?;
        let existing = self.courses.list_listings().await?;
        let taken: Vec<&str> = existing.iter().map(|c| c.id.as_str()).collect();
        let id = CourseId::new(sequential_id(&taken, existing.len()));

        let listing = draft.validate(id, self.clock.now())?;
        self.courses.insert_listing(&listing).await?;
        tracing::info!(admin = %admin.id(), course = %listing.id, "course created");
        Ok(listing)
    }

    /// Returns whether a course was removed. Its module rows go with it.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn delete_course(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
    ) -> Result<bool, CatalogServiceError> {
        let admin = require_admin(actor)?;
        let removed = self.courses.delete_listing(course_id).await?;
        if removed {
            let modules = self.modules.delete_module_listings(course_id).await?;
            tracing::info!(
                admin = %admin.id(),
                course = %course_id,
                modules,
                "course deleted"
            );
        }
        Ok(removed)
    }

    //
    // ─── MODULES ───────────────────────────────────────────────────────────────
    //

    async fn known_course(&self, course_id: &CourseId) -> Result<(), CatalogServiceError> {
        let listings = self.courses.list_listings().await?;
        if listings.iter().any(|c| &c.id == course_id) {
            Ok(())
        } else {
            Err(CatalogServiceError::UnknownCourse(course_id.clone()))
        }
    }

    async fn sorted_modules(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<ModuleListing>, CatalogServiceError> {
        let mut rows = self.modules.list_module_listings(course_id).await?;
        rows.sort_by_key(|row| row.order);
        Ok(rows)
    }

    /// Modules of a course in display order, filtered like courses.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::UnknownCourse` if the course does not exist.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list_modules(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
        query: &str,
    ) -> Result<Vec<ModuleListing>, CatalogServiceError> {
        require_admin(actor)?;
        self.known_course(course_id).await?;
        let mut rows = self.sorted_modules(course_id).await?;
        rows.retain(|row| row.matches(query));
        Ok(rows)
    }

    /// Append a draft module at the end of the course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::UnknownCourse` if the course does not exist.
    /// Returns `CatalogServiceError::Catalog` if the draft is invalid.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn create_module(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
        draft: ModuleListingDraft,
    ) -> Result<ModuleListing, CatalogServiceError> {
        let admin = require_admin(actor)?;
        self.known_course(course_id).await?;
        let rows = self.modules.list_module_listings(course_id).await?;
        let order = rows.iter().map(|row| row.order).max().map_or(1, |max| max + 1);
        let id = ModuleId::new(format!("m{}", self.module_ids.next(&self.clock)));

        let listing = draft.validate(id, order)?;
        self.modules.insert_module_listing(course_id, &listing).await?;
        tracing::info!(
            admin = %admin.id(),
            course = %course_id,
            module = %listing.id,
            order,
            "module created"
        );
        Ok(listing)
    }

    /// Returns whether a module was removed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn delete_module(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<bool, CatalogServiceError> {
        let admin = require_admin(actor)?;
        let removed = self.modules.delete_module_listing(course_id, module_id).await?;
        if removed {
            tracing::info!(
                admin = %admin.id(),
                course = %course_id,
                module = %module_id,
                "module deleted"
            );
        }
        Ok(removed)
    }

    /// Swap a module with its predecessor. Returns whether anything moved.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn move_module_up(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<bool, CatalogServiceError> {
        self.move_module(actor, course_id, module_id, Direction::Up).await
    }

    /// Swap a module with its successor. Returns whether anything moved.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn move_module_down(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
        module_id: &ModuleId,
    ) -> Result<bool, CatalogServiceError> {
        self.move_module(actor, course_id, module_id, Direction::Down).await
    }

    async fn move_module(
        &self,
        actor: Option<&SessionRecord>,
        course_id: &CourseId,
        module_id: &ModuleId,
        direction: Direction,
    ) -> Result<bool, CatalogServiceError> {
        let admin = require_admin(actor)?;
        let mut rows = self.sorted_modules(course_id).await?;
        let Some(pos) = rows.iter().position(|row| &row.id == module_id) else {
            return Ok(false);
        };
        let neighbour = match direction {
            Direction::Up => pos.checked_sub(1),
            Direction::Down => Some(pos + 1).filter(|&n| n < rows.len()),
        };
        let Some(neighbour) = neighbour else {
            return Ok(false);
        };

        let order = rows[pos].order;
        rows[pos].order = rows[neighbour].order;
        rows[neighbour].order = order;
        rows.swap(pos, neighbour);

        self.modules.replace_module_listings(course_id, &rows).await?;
        tracing::info!(
            admin = %admin.id(),
            course = %course_id,
            module = %module_id,
            ?direction,
            "module moved"
        );
        Ok(true)
    }

    //
    // ─── USERS ─────────────────────────────────────────────────────────────────
    //

    /// Users whose name or email contains `query` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list_users(
        &self,
        actor: Option<&SessionRecord>,
        query: &str,
    ) -> Result<Vec<UserAccount>, CatalogServiceError> {
        require_admin(actor)?;
        let mut rows = self.users.list_users().await?;
        rows.retain(|row| row.matches(query));
        Ok(rows)
    }

    /// Add an active account.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Catalog` if the draft is invalid.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn create_user(
        &self,
        actor: Option<&SessionRecord>,
        draft: UserAccountDraft,
    ) -> Result<UserAccount, CatalogServiceError> {
        let admin = require_admin(actor)?;
        let existing = self.users.list_users().await?;
        let taken: Vec<&str> = existing.iter().map(|u| u.id.as_str()).collect();
        let id = UserId::new(sequential_id(&taken, existing.len()));

        let account = draft.validate(id, self.clock.now())?;
        self.users.insert_user(&account).await?;
        tracing::info!(
            admin = %admin.id(),
            user = %account.id,
            role = ?account.role,
            "user created"
        );
        Ok(account)
    }

    /// Returns whether an account was removed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if persistence fails.
    pub async fn delete_user(
        &self,
        actor: Option<&SessionRecord>,
        user_id: &UserId,
    ) -> Result<bool, CatalogServiceError> {
        let admin = require_admin(actor)?;
        let removed = self.users.delete_user(user_id).await?;
        if removed {
            tracing::info!(admin = %admin.id(), user = %user_id, "user deleted");
        }
        Ok(removed)
    }

    //
    // ─── OVERVIEW ──────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `CatalogServiceError::Forbidden` for non-admin actors.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn overview(
        &self,
        actor: Option<&SessionRecord>,
    ) -> Result<CatalogOverview, CatalogServiceError> {
        require_admin(actor)?;
        let courses = self.courses.list_listings().await?;
        let users = self.users.list_users().await?;

        Ok(CatalogOverview {
            total_courses: courses.len(),
            published_courses: courses
                .iter()
                .filter(|c| c.status == PublishStatus::Published)
                .count(),
            active_users: users
                .iter()
                .filter(|u| u.status == AccountStatus::Active)
                .count(),
            total_enrollments: courses.iter().map(|c| c.enrollments).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::Role;
    use academy_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn service() -> CatalogService {
        let repo = InMemoryRepository::with_fixtures().unwrap();
        CatalogService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo),
        )
    }

    fn admin() -> SessionRecord {
        SessionRecord::new(UserId::new("admin1"), "Admin User", "admin@tum-academy.de", true)
    }

    fn learner() -> SessionRecord {
        SessionRecord::learner(UserId::new("user1"), "Test User", "user@tum-academy.de")
    }

    fn module_ids(rows: &[ModuleListing]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn sequential_ids_skip_taken_values() {
        assert_eq!(sequential_id(&["1", "2"], 2), "3");
        assert_eq!(sequential_id(&["1", "3"], 2), "4");
        assert_eq!(sequential_id(&[], 0), "1");
    }

    #[tokio::test]
    async fn non_admins_are_refused() {
        let service = service();
        let user = learner();
        assert!(matches!(
            service.list_courses(Some(&user), "").await,
            Err(CatalogServiceError::Forbidden)
        ));
        assert!(matches!(
            service.overview(None).await,
            Err(CatalogServiceError::Forbidden)
        ));
        assert!(matches!(
            service.delete_user(Some(&user), &UserId::new("1")).await,
            Err(CatalogServiceError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn course_lifecycle() {
        let service = service();
        let root = admin();
        let actor = Some(&root);

        let created = service
            .create_course(
                actor,
                CourseListingDraft {
                    title: "Fahrgastbeförderung".into(),
                    description: "Grundlagen".into(),
                    price: "199".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, CourseId::new("3"));
        assert_eq!(created.status, PublishStatus::Draft);

        let hits = service.list_courses(actor, "fahrgast").await.unwrap();
        assert_eq!(hits.len(), 1);

        assert!(service.delete_course(actor, &created.id).await.unwrap());
        assert!(!service.delete_course(actor, &created.id).await.unwrap());
        assert_eq!(service.list_courses(actor, "").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn recreated_course_id_starts_without_modules() {
        let service = service();
        let root = admin();
        let actor = Some(&root);
        let course = CourseId::new("2");

        assert!(service.delete_course(actor, &course).await.unwrap());
        let created = service
            .create_course(
                actor,
                CourseListingDraft {
                    title: "Aufbaukurs".into(),
                    description: "Neu aufgelegt".into(),
                    price: "299".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, course);

        let rows = service.list_modules(actor, &course, "").await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn invalid_course_draft_is_rejected() {
        let service = service();
        let root = admin();
        let err = service
            .create_course(Some(&root), CourseListingDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogServiceError::Catalog(_)));
    }

    #[tokio::test]
    async fn modules_append_and_reorder() {
        let service = service();
        let root = admin();
        let actor = Some(&root);
        let course = CourseId::new("2");

        let created = service
            .create_module(
                actor,
                &course,
                ModuleListingDraft {
                    title: "Fahrzeugflotte".into(),
                    description: "Beschaffung und Wartung".into(),
                    duration: "4 Stunden".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.order, 4);
        assert!(created.id.as_str().starts_with('m'));

        assert!(service.move_module_up(actor, &course, &created.id).await.unwrap());
        let rows = service.list_modules(actor, &course, "").await.unwrap();
        assert_eq!(module_ids(&rows), vec!["m5", "m6", created.id.as_str(), "m7"]);
        let orders: Vec<u32> = rows.iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);

        assert!(!service.move_module_up(actor, &course, &ModuleId::new("m5")).await.unwrap());
        assert!(!service.move_module_down(actor, &course, &ModuleId::new("m7")).await.unwrap());
        assert!(!service.move_module_down(actor, &course, &ModuleId::new("nope")).await.unwrap());

        assert!(service.delete_module(actor, &course, &created.id).await.unwrap());
        let rows = service.list_modules(actor, &course, "").await.unwrap();
        assert_eq!(module_ids(&rows), vec!["m5", "m6", "m7"]);
    }

    #[tokio::test]
    async fn modules_of_unknown_course_are_refused() {
        let service = service();
        let root = admin();
        let err = service
            .list_modules(Some(&root), &CourseId::new("42"), "")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogServiceError::UnknownCourse(_)));
    }

    #[tokio::test]
    async fn users_and_overview() {
        let service = service();
        let root = admin();
        let actor = Some(&root);

        let before = service.overview(actor).await.unwrap();
        assert_eq!(
            before,
            CatalogOverview {
                total_courses: 2,
                published_courses: 1,
                active_users: 3,
                total_enrollments: 48,
            }
        );

        let created = service
            .create_user(
                actor,
                UserAccountDraft {
                    name: "Lena Koch".into(),
                    email: "lena@example.com".into(),
                    password: "geheim".into(),
                    role: Role::User,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, UserId::new("5"));
        assert_eq!(created.status, AccountStatus::Active);

        let found = service.list_users(actor, "LENA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(service.overview(actor).await.unwrap().active_users, 4);

        assert!(service.delete_user(actor, &UserId::new("3")).await.unwrap());
        assert_eq!(service.list_users(actor, "").await.unwrap().len(), 4);
    }
}
