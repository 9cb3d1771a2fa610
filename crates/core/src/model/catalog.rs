use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{CourseId, ModuleId, UserId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

//
// ─── SHARED ENUMS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    Published,
    Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Inactive,
}

fn required(value: String, field: &'static str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::MissingField(field));
    }
    Ok(trimmed.to_owned())
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

//
// ─── COURSE LISTING ───────────────────────────────────────────────────────────
//

/// Admin-side row for a course offering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListing {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub module_count: u32,
    pub status: PublishStatus,
    pub enrollments: u32,
    pub price_eur: u32,
    pub created_at: DateTime<Utc>,
}

impl CourseListing {
    /// Case-insensitive substring match on title or description.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || contains_ci(&self.title, &q) || contains_ci(&self.description, &q)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseListingDraft {
    pub title: String,
    pub description: String,
    pub price: String,
}

impl CourseListingDraft {
    /// Validate a new course; it starts as an empty, unpublished draft.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingField` for blank fields, or
    /// `CatalogError::InvalidPrice` if the price is not a whole euro amount.
    pub fn validate(self, id: CourseId, now: DateTime<Utc>) -> Result<CourseListing, CatalogError> {
        let title = required(self.title, "title")?;
        let description = required(self.description, "description")?;
        let price = required(self.price, "price")?;
        let price_eur = price
            .trim_end_matches('€')
            .trim()
            .parse::<u32>()
            .map_err(|_| CatalogError::InvalidPrice(price.clone()))?;

        Ok(CourseListing {
            id,
            title,
            description,
            module_count: 0,
            status: PublishStatus::Draft,
            enrollments: 0,
            price_eur,
            created_at: now,
        })
    }
}

//
// ─── MODULE LISTING ───────────────────────────────────────────────────────────
//

/// Admin-side row for a module inside a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleListing {
    pub id: ModuleId,
    pub title: String,
    pub description: String,
    /// 1-based position within the course.
    pub order: u32,
    pub duration: String,
    pub lesson_count: u32,
    pub status: PublishStatus,
}

impl ModuleListing {
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || contains_ci(&self.title, &q) || contains_ci(&self.description, &q)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleListingDraft {
    pub title: String,
    pub description: String,
    pub duration: String,
}

impl ModuleListingDraft {
    /// Validate a new module placed at `order`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingField` for blank fields.
    pub fn validate(self, id: ModuleId, order: u32) -> Result<ModuleListing, CatalogError> {
        Ok(ModuleListing {
            id,
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            order,
            duration: required(self.duration, "duration")?,
            lesson_count: 0,
            status: PublishStatus::Draft,
        })
    }
}

//
// ─── USER ACCOUNT ─────────────────────────────────────────────────────────────
//

/// Admin-side row for a portal user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub enrolled_courses: u32,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Case-insensitive substring match on name or email.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        q.is_empty() || contains_ci(&self.name, &q) || contains_ci(&self.email, &q)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccountDraft {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl UserAccountDraft {
    /// Validate a new account. The password is required but never stored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingField` for blank fields.
    pub fn validate(self, id: UserId, now: DateTime<Utc>) -> Result<UserAccount, CatalogError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        required(self.password, "password")?;

        Ok(UserAccount {
            id,
            name,
            email,
            role: self.role,
            status: AccountStatus::Active,
            enrolled_courses: 0,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn course_draft_parses_price() {
        let listing = CourseListingDraft {
            title: "Aufbaukurs".into(),
            description: "Vertiefung".into(),
            price: "299 €".into(),
        }
        .validate(CourseId::new("3"), fixed_now())
        .unwrap();
        assert_eq!(listing.price_eur, 299);
        assert_eq!(listing.status, PublishStatus::Draft);
        assert_eq!(listing.module_count, 0);
    }

    #[test]
    fn course_draft_requires_every_field() {
        let err = CourseListingDraft {
            title: "T".into(),
            description: " ".into(),
            price: "1".into(),
        }
        .validate(CourseId::new("3"), fixed_now())
        .unwrap_err();
        assert_eq!(err, CatalogError::MissingField("description"));

        let err = CourseListingDraft {
            title: "T".into(),
            description: "D".into(),
            price: "cheap".into(),
        }
        .validate(CourseId::new("3"), fixed_now())
        .unwrap_err();
        assert_eq!(err, CatalogError::InvalidPrice("cheap".into()));
    }

    #[test]
    fn user_draft_requires_password() {
        let err = UserAccountDraft {
            name: "Anna".into(),
            email: "anna@example.com".into(),
            password: String::new(),
            role: Role::User,
        }
        .validate(UserId::new("5"), fixed_now())
        .unwrap_err();
        assert_eq!(err, CatalogError::MissingField("password"));
    }

    #[test]
    fn search_is_case_insensitive() {
        let module = ModuleListingDraft {
            title: "Gesetzliche Grundlagen".into(),
            description: "Arbeitsrecht".into(),
            duration: "8 Stunden".into(),
        }
        .validate(ModuleId::new("m2"), 2)
        .unwrap();
        assert!(module.matches("gesetz"));
        assert!(module.matches("ARBEITS"));
        assert!(module.matches(""));
        assert!(!module.matches("marketing"));
    }
}
