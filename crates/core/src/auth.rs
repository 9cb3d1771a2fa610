//! Demo credential table and registration form checks.
//!
//! The portal ships without an account store: exactly two literal accounts can
//! sign in, and anyone can register a fresh learner session.

use thiserror::Error;

use crate::model::{SessionRecord, UserId};

/// A hard-coded sign-in entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoAccount {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub is_admin: bool,
}

pub const ADMIN_ACCOUNT: DemoAccount = DemoAccount {
    id: "admin1",
    name: "Admin User",
    email: "admin@tum-academy.de",
    password: "password",
    is_admin: true,
};

pub const LEARNER_ACCOUNT: DemoAccount = DemoAccount {
    id: "user1",
    name: "Test User",
    email: "user@tum-academy.de",
    password: "password",
    is_admin: false,
};

pub const DEMO_ACCOUNTS: [DemoAccount; 2] = [ADMIN_ACCOUNT, LEARNER_ACCOUNT];

/// Match an email/password pair against the demo table (plain equality).
#[must_use]
pub fn authenticate(email: &str, password: &str) -> Option<SessionRecord> {
    DEMO_ACCOUNTS
        .iter()
        .find(|acct| acct.email == email && acct.password == password)
        .map(|acct| SessionRecord::new(UserId::new(acct.id), acct.name, email, acct.is_admin))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistrationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Sign-up form as submitted, before the gate sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Form values that passed the sign-up checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Check required fields and the password confirmation.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::MissingField` for blank fields and
    /// `RegistrationError::PasswordMismatch` when the confirmation differs.
    pub fn validate(self) -> Result<Registration, RegistrationError> {
        let name = self.name.trim().to_owned();
        let email = self.email.trim().to_owned();
        if name.is_empty() {
            return Err(RegistrationError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(RegistrationError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(RegistrationError::MissingField("password"));
        }
        if self.password != self.confirm_password {
            return Err(RegistrationError::PasswordMismatch);
        }

        Ok(Registration {
            name,
            email,
            password: self.password,
        })
    }
}
