use serde::{Deserialize, Serialize};

use crate::model::UserId;

/// The signed-in actor: identity plus the admin capability flag.
///
/// Serialized as `{ "id", "name", "email", "isAdmin" }`, the exact shape of the
/// persisted session blob. The capability flag is fixed at construction; there
/// is no way to promote or demote an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    id: UserId,
    name: String,
    email: String,
    is_admin: bool,
}

impl SessionRecord {
    #[must_use]
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        is_admin: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            is_admin,
        }
    }

    /// A freshly registered learner. Never carries the admin capability.
    #[must_use]
    pub fn learner(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, name, email, false)
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}
