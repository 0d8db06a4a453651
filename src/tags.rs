//! Tag normalization.
//!
//! Tags are matched case-insensitively and without surrounding whitespace.
//! Every tag that enters the crate goes through [`normalize_tag`], so two
//! tags compare equal exactly when their normalized text is equal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default cap on the number of tags an option may carry.
pub const MAX_TAGS_PER_OPTION: usize = 5;

/// A single normalized (trimmed, lower-cased, non-empty) tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Normalizes and wraps a tag, rejecting blank input.
    ///
    /// # Errors
    /// `EmptyTag` if nothing is left after normalization.
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        normalize_tag(raw).ok_or(ValidationError::EmptyTag)
    }

    /// Returns the normalized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Tag {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims and lower-cases a tag. Blank input yields `None`.
#[must_use]
pub fn normalize_tag(raw: &str) -> Option<Tag> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(Tag(trimmed.to_lowercase()))
}

/// Ordered, duplicate-free collection of normalized tags.
///
/// Insertion order is preserved so tags render the way the user typed them.
/// Deserialization is lenient: blank entries are dropped and duplicates are
/// collapsed, which lets snapshots written by older clients load cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a tag, returning false if it was already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Returns true if the set contains the (normalized) tag text.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        match normalize_tag(tag) {
            Some(tag) => self.0.contains(&tag),
            None => false,
        }
    }

    /// Returns true if the two sets share at least one tag.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.0.iter().any(|tag| other.0.contains(tag))
    }

    /// Keeps only the first `limit` tags.
    pub fn truncate(&mut self, limit: usize) {
        self.0.truncate(limit);
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<String>> for TagSet {
    fn from(raw: Vec<String>) -> Self {
        raw.iter().filter_map(|t| normalize_tag(t)).collect()
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0.into_iter().map(String::from).collect()
    }
}

/// Normalizes an arbitrary list of tag strings into a set.
#[must_use]
pub fn normalize_tags<I, S>(raw: I) -> TagSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|t| normalize_tag(t.as_ref()))
        .collect()
}

/// Parses comma-separated tag input from a form field.
///
/// Blank entries are skipped, duplicates collapse onto the first occurrence
/// and the result is truncated to `limit` tags.
///
/// ```
/// use make_a_decision::tags::parse_tag_list;
///
/// let tags = parse_tag_list(" Indoor, quiet,, INDOOR ", 5);
/// let names: Vec<_> = tags.iter().map(|t| t.as_str()).collect();
/// assert_eq!(names, ["indoor", "quiet"]);
/// ```
#[must_use]
pub fn parse_tag_list(input: &str, limit: usize) -> TagSet {
    if input.trim().is_empty() {
        return TagSet::new();
    }
    let mut set = normalize_tags(input.split(','));
    set.truncate(limit);
    set
}
