//! Per-request catalog snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::option::{DecisionOption, OptionId, UserId};
use crate::selection::catalog_weight;
use crate::storage::{OptionStore, StorageError};

/// A read-only copy of one user's catalog, taken once per request.
///
/// Filtering and probability reporting both read the same snapshot, so the
/// catalog is fetched exactly once per pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    user_id: UserId,
    options: Vec<DecisionOption>,
    taken_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Wraps an already-materialized option list.
    #[must_use]
    pub const fn new(user_id: UserId, options: Vec<DecisionOption>, taken_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            options,
            taken_at,
        }
    }

    /// Reads the user's full catalog from a store.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the listing fails.
    pub fn capture(
        store: &dyn OptionStore,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        let options = store.list_for_user(user_id)?;
        Ok(Self::new(user_id, options, now))
    }

    /// Owner of the catalog.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// When the copy was taken.
    #[must_use]
    pub const fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Options in catalog order.
    #[must_use]
    pub fn options(&self) -> &[DecisionOption] {
        &self.options
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if the catalog was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Looks up an option by id.
    #[must_use]
    pub fn get(&self, id: OptionId) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Sum of every option's weight.
    #[must_use]
    pub fn total_weight(&self) -> u64 {
        catalog_weight(&self.options)
    }

    /// Consumes the snapshot, returning its options.
    #[must_use]
    pub fn into_options(self) -> Vec<DecisionOption> {
        self.options
    }
}
