//! In-memory storage backend.
//!
//! This module provides thread-safe in-memory implementations of the storage traits.
//! It is intended for embedded usage, tests, and as a reference implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::option::{DecisionOption, OptionDraft, OptionId, UserId};
use crate::session::Session;
use crate::storage::traits::{OptionStore, SessionStore, StorageError, UserStore};
use crate::tags::Tag;
use crate::user::User;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct OptionState {
    last_id: u64,
    by_id: BTreeMap<OptionId, DecisionOption>,
    by_user: HashMap<UserId, BTreeSet<OptionId>>,
}

impl OptionState {
    fn owned(&self, user_id: UserId, id: OptionId) -> Option<&DecisionOption> {
        self.by_id.get(&id).filter(|opt| opt.user_id == user_id)
    }
}

/// Thread-safe in-memory option store.
///
/// Ids are assigned from a single counter, so they are unique across users
/// and increase with creation time.
#[derive(Debug, Default)]
pub struct InMemoryOptionStore {
    state: RwLock<OptionState>,
}

impl InMemoryOptionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for InMemoryOptionStore {
    fn create(&self, draft: OptionDraft) -> Result<DecisionOption, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("option.create"))?;
        state.last_id += 1;
        let id = OptionId::new(state.last_id);
        let option = draft.into_option(id, Utc::now());

        state.by_user.entry(option.user_id).or_default().insert(id);
        state.by_id.insert(id, option.clone());
        Ok(option)
    }

    fn get(&self, user_id: UserId, id: OptionId) -> Result<Option<DecisionOption>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("option.get"))?;
        Ok(state.owned(user_id, id).cloned())
    }

    fn update(&self, option: DecisionOption) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("option.update"))?;
        if state.owned(option.user_id, option.id).is_none() {
            return Err(StorageError::OptionNotFound(option.id));
        }
        state.by_id.insert(option.id, option);
        Ok(())
    }

    fn delete(&self, user_id: UserId, id: OptionId) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("option.delete"))?;
        if state.owned(user_id, id).is_none() {
            return Err(StorageError::OptionNotFound(id));
        }
        state.by_id.remove(&id);
        if let Some(ids) = state.by_user.get_mut(&user_id) {
            ids.remove(&id);
            if ids.is_empty() {
                state.by_user.remove(&user_id);
            }
        }
        Ok(())
    }

    fn list_for_user(&self, user_id: UserId) -> Result<Vec<DecisionOption>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("option.list_for_user"))?;
        let Some(ids) = state.by_user.get(&user_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect())
    }

    fn tags_for_user(&self, user_id: UserId) -> Result<Vec<Tag>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("option.tags_for_user"))?;
        let Some(ids) = state.by_user.get(&user_id) else {
            return Ok(Vec::new());
        };
        let tags: BTreeSet<Tag> = ids
            .iter()
            .filter_map(|id| state.by_id.get(id))
            .flat_map(|opt| opt.tags.iter().cloned())
            .collect();
        Ok(tags.into_iter().collect())
    }
}

#[derive(Debug, Default)]
struct UserState {
    last_id: u64,
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

/// Thread-safe in-memory user store.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: RwLock<UserState>,
}

impl InMemoryUserStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn create(&self, email: String, password_hash: String) -> Result<User, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("user.create"))?;
        if state.by_email.contains_key(&email) {
            return Err(StorageError::DuplicateKey(email));
        }
        state.last_id += 1;
        let user = User {
            id: UserId::new(state.last_id),
            email,
            password_hash,
            created_at: Utc::now(),
        };
        state.by_email.insert(user.email.clone(), user.id);
        state.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    fn get(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("user.get"))?;
        Ok(state.by_id.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("user.find_by_email"))?;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.by_id.get(id))
            .cloned())
    }
}

/// Thread-safe in-memory session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    ///
    /// # Errors
    /// `BackendError` if the lock is poisoned.
    pub fn session_count(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("session.session_count"))?;
        Ok(state.len())
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("session.insert"))?;
        if state.contains_key(&session.token_digest) {
            return Err(StorageError::DuplicateKey(session.token_digest));
        }
        state.insert(session.token_digest.clone(), session);
        Ok(())
    }

    fn get(&self, token_digest: &str) -> Result<Option<Session>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("session.get"))?;
        Ok(state.get(token_digest).cloned())
    }

    fn update_expiry(
        &self,
        token_digest: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("session.update_expiry"))?;
        let session = state
            .get_mut(token_digest)
            .ok_or(StorageError::SessionNotFound)?;
        session.expires_at = expires_at;
        Ok(())
    }

    fn delete(&self, token_digest: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("session.delete"))?;
        state.remove(token_digest);
        Ok(())
    }

    fn delete_expired_for_user(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<usize, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| lock_err("session.delete_expired_for_user"))?;
        let before = state.len();
        state.retain(|_, s| s.user_id != user_id || !s.is_expired(now));
        Ok(before - state.len())
    }
}

/// Convenience bundle of shared in-memory stores.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStores {
    /// Option store.
    pub options: Arc<InMemoryOptionStore>,
    /// User store.
    pub users: Arc<InMemoryUserStore>,
    /// Session store.
    pub sessions: Arc<InMemorySessionStore>,
}

impl InMemoryStores {
    /// Create a new bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
