//! User accounts.
//!
//! Password hashing is delegated to the caller; this module only stores the
//! opaque hash string it is handed.

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{DecisionResult, ExecutionError, ValidationError};
use crate::option::UserId;
use crate::storage::{StorageError, UserStore};

/// Longest accepted email address.
pub const MAX_EMAIL_LEN: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    })
}

/// A registered account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned id.
    pub id: UserId,
    /// Normalized (trimmed, lower-cased) email.
    pub email: String,
    /// Opaque hash supplied at registration; never logged.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Trims and lower-cases an email address.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Checks the shape of an already-normalized email address.
///
/// # Errors
/// `InvalidEmail` if the address does not look like one.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "email".to_string(),
            max_length: MAX_EMAIL_LEN,
        });
    }
    if !email_regex().is_match(email) {
        return Err(ValidationError::InvalidEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}

/// Account registration and lookup.
#[derive(Clone)]
pub struct Accounts {
    users: Arc<dyn UserStore>,
}

impl Accounts {
    /// Create a new accounts facade over a user store.
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// # Errors
    /// - `InvalidEmail` / `FieldTooLong` if the email is malformed
    /// - `UserAlreadyExists` if the normalized email is taken
    pub fn register(&self, email: &str, password_hash: impl Into<String>) -> DecisionResult<User> {
        let email = normalize_email(email);
        validate_email(&email)?;

        if self.users.find_by_email(&email)?.is_some() {
            return Err(ExecutionError::UserAlreadyExists { email }.into());
        }

        let user = match self.users.create(email.clone(), password_hash.into()) {
            Ok(user) => user,
            // Lost a race with a concurrent registration.
            Err(StorageError::DuplicateKey(_)) => {
                return Err(ExecutionError::UserAlreadyExists { email }.into());
            }
            Err(e) => return Err(e.into()),
        };

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Look up an account by email (normalized before lookup).
    ///
    /// # Errors
    /// Storage failures.
    pub fn find_by_email(&self, email: &str) -> DecisionResult<Option<User>> {
        Ok(self.users.find_by_email(&normalize_email(email))?)
    }

    /// Get an account by id.
    ///
    /// # Errors
    /// `UserNotFound`, or a storage failure.
    pub fn get(&self, id: UserId) -> DecisionResult<User> {
        self.users
            .get(id)?
            .ok_or_else(|| ExecutionError::UserNotFound { id }.into())
    }
}
