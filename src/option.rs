//! Option records and their identity types.
//!
//! An option is a user-defined activity: a display name, a relative weight,
//! an optional duration and a small set of normalized tags. Options are owned
//! by the storage layer; the selection engine only ever reads them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::tags::TagSet;

/// Numeric option identifier, unique per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(u64);

impl OptionId {
    /// Wraps a raw numeric id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OptionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Opaque user identifier handed out by the user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// Wraps a raw numeric id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relative likelihood mass of an option, always within `[MIN, MAX]`.
///
/// Conversions from untrusted raw values are lenient: a missing, zero or
/// negative weight becomes the default of 1 and anything above the maximum
/// is capped. Strict validation is available through [`Weight::new`].
///
/// # Examples
///
/// ```
/// use make_a_decision::Weight;
///
/// assert_eq!(Weight::default().get(), 1);
/// assert_eq!(Weight::lenient(Some(0)).get(), 1);
/// assert_eq!(Weight::lenient(Some(42)).get(), 10);
/// assert!(Weight::new(11).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<i64>", into = "u8")]
pub struct Weight(u8);

impl Weight {
    /// Smallest persisted weight.
    pub const MIN: u8 = 1;
    /// Largest persisted weight.
    pub const MAX: u8 = 10;

    /// Creates a weight, rejecting values outside `[MIN, MAX]`.
    ///
    /// # Errors
    /// `WeightOutOfRange` outside `1..=10`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(ValidationError::WeightOutOfRange {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = value as u8;
        Ok(Self(raw))
    }

    /// Clamps any integer into `[MIN, MAX]`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let raw = value.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8;
        Self(raw)
    }

    /// Interprets a stored weight that may be absent or invalid.
    ///
    /// Absent and non-positive values map to the default weight.
    #[must_use]
    pub fn lenient(value: Option<i64>) -> Self {
        match value {
            Some(v) if v >= i64::from(Self::MIN) => Self::clamped(v),
            _ => Self::default(),
        }
    }

    /// Returns the raw weight.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One step heavier, saturating at `MAX`.
    #[must_use]
    pub const fn increased(self) -> Self {
        if self.0 >= Self::MAX {
            self
        } else {
            Self(self.0 + 1)
        }
    }

    /// One step lighter, saturating at `MIN`.
    #[must_use]
    pub const fn decreased(self) -> Self {
        if self.0 <= Self::MIN {
            self
        } else {
            Self(self.0 - 1)
        }
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl From<Option<i64>> for Weight {
    fn from(value: Option<i64>) -> Self {
        Self::lenient(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper bound on a declared option duration (one day).
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Validates a raw duration in minutes against `[0, max]`.
///
/// # Errors
/// `DurationOutOfRange` outside `0..=max`.
pub fn validate_duration(minutes: i64, max: u32) -> Result<u32, ValidationError> {
    if minutes < 0 || minutes > i64::from(max) {
        return Err(ValidationError::DurationOutOfRange { minutes, max });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let minutes = minutes as u32;
    Ok(minutes)
}

/// A stored option belonging to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Store-assigned id.
    pub id: OptionId,

    /// Owner.
    pub user_id: UserId,

    /// Display text, never blank.
    pub name: String,

    /// Relative pick weight.
    #[serde(default)]
    pub weight: Weight,

    /// Declared duration; `None` means the option fits any time budget.
    #[serde(default)]
    pub duration_minutes: Option<u32>,

    /// Normalized tags, at most the configured limit.
    #[serde(default)]
    pub tags: TagSet,

    /// Creation time.
    pub created_at: DateTime<Utc>,

    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl DecisionOption {
    /// Returns true if the option declares no duration.
    #[must_use]
    pub const fn is_flexible(&self) -> bool {
        self.duration_minutes.is_none()
    }

    /// Returns true if the option carries no tags.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    /// Bumps `updated_at` to the current time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// The fields needed to create an option; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    /// Owner.
    pub user_id: UserId,
    /// Display text.
    pub name: String,
    /// Relative pick weight.
    pub weight: Weight,
    /// Declared duration, if any.
    pub duration_minutes: Option<u32>,
    /// Normalized tags.
    pub tags: TagSet,
}

impl OptionDraft {
    /// Creates a draft with default weight, no duration and no tags.
    #[must_use]
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            weight: Weight::default(),
            duration_minutes: None,
            tags: TagSet::new(),
        }
    }

    /// Sets the weight.
    #[must_use]
    pub fn weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the declared duration.
    #[must_use]
    pub fn duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Materializes the draft into a stored option.
    #[must_use]
    pub fn into_option(self, id: OptionId, now: DateTime<Utc>) -> DecisionOption {
        DecisionOption {
            id,
            user_id: self.user_id,
            name: self.name,
            weight: self.weight,
            duration_minutes: self.duration_minutes,
            tags: self.tags,
            created_at: now,
            updated_at: now,
        }
    }
}
