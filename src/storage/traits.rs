//! Abstract storage traits.
//!
//! These traits define the contract the persistence collaborator must
//! implement. The in-memory backends in [`super::memory`] are the reference
//! implementation; a SQL-backed store only needs to satisfy the same traits.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::option::{DecisionOption, OptionDraft, OptionId, UserId};
use crate::session::Session;
use crate::tags::Tag;
use crate::user::User;

/// Errors that can occur during storage operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Option not found (or not owned by the requesting user).
    #[error("Option not found: {0}")]
    OptionNotFound(OptionId),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Session not found.
    #[error("Session not found")]
    SessionNotFound,

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Storage trait for a user's option catalog.
///
/// Every lookup is scoped by [`UserId`]; an option owned by another user is
/// indistinguishable from a missing one.
pub trait OptionStore: Send + Sync {
    /// Create an option from a draft, assigning a fresh id and timestamps.
    fn create(&self, draft: OptionDraft) -> Result<DecisionOption, StorageError>;

    /// Get one of the user's options by id.
    fn get(&self, user_id: UserId, id: OptionId) -> Result<Option<DecisionOption>, StorageError>;

    /// Replace a stored option. Returns `OptionNotFound` if the id does not
    /// exist for `option.user_id`.
    fn update(&self, option: DecisionOption) -> Result<(), StorageError>;

    /// Delete one of the user's options. Returns `OptionNotFound` if missing.
    fn delete(&self, user_id: UserId, id: OptionId) -> Result<(), StorageError>;

    /// All of the user's options in creation order.
    fn list_for_user(&self, user_id: UserId) -> Result<Vec<DecisionOption>, StorageError>;

    /// Distinct tags currently attached to any of the user's options, sorted.
    fn tags_for_user(&self, user_id: UserId) -> Result<Vec<Tag>, StorageError>;
}

/// Storage trait for user accounts.
pub trait UserStore: Send + Sync {
    /// Create a user with an already-normalized email. Returns `DuplicateKey`
    /// if the email is taken.
    fn create(&self, email: String, password_hash: String) -> Result<User, StorageError>;

    /// Get a user by id.
    fn get(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Find a user by normalized email.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;
}

/// Storage trait for sign-in sessions, keyed by token digest.
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Returns `DuplicateKey` if the digest exists.
    fn insert(&self, session: Session) -> Result<(), StorageError>;

    /// Get a session by token digest.
    fn get(&self, token_digest: &str) -> Result<Option<Session>, StorageError>;

    /// Move a session's expiry. Returns `SessionNotFound` if missing.
    fn update_expiry(&self, token_digest: &str, expires_at: DateTime<Utc>)
        -> Result<(), StorageError>;

    /// Delete a session. Deleting a missing session is not an error.
    fn delete(&self, token_digest: &str) -> Result<(), StorageError>;

    /// Delete the user's sessions that expired at or before `now`, returning
    /// how many were removed.
    fn delete_expired_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<usize, StorageError>;
}
