//! Per-pick constraints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::tags::{normalize_tag, TagSet};

/// Constraints for one pick: an optional time budget and a tag filter.
///
/// A missing or non-positive budget means "no time constraint"; an empty
/// tag set means "no tag filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Time budget in minutes. Non-positive input deserializes to `None`.
    #[serde(default, deserialize_with = "deserialize_budget")]
    pub time_constraint_minutes: Option<u32>,
    /// Tag filter; any shared tag matches.
    #[serde(default)]
    pub selected_tags: TagSet,
}

/// Signed budgets are accepted on the wire and mapped the same way the
/// builder maps them.
fn deserialize_budget<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|minutes| {
        SelectionRequestBuilder::new()
            .time_constraint_minutes(minutes)
            .time_constraint_minutes
    }))
}

impl SelectionRequest {
    /// A request with no constraints.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Start building a request.
    #[must_use]
    pub fn builder() -> SelectionRequestBuilder {
        SelectionRequestBuilder::new()
    }

    /// Build a request from raw form fields.
    ///
    /// Unparsable hour/minute fields count as zero, and the budget is only
    /// applied when `hours * 60 + minutes` is positive.
    #[must_use]
    pub fn from_form<I, S>(hours: &str, minutes: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hours = hours.trim().parse::<i64>().unwrap_or(0);
        let minutes = minutes.trim().parse::<i64>().unwrap_or(0);
        SelectionRequestBuilder::new()
            .time_budget(hours, minutes)
            .tags(tags)
            .build()
    }

    /// The effective time budget, if any.
    #[must_use]
    pub const fn time_budget(&self) -> Option<u32> {
        match self.time_constraint_minutes {
            Some(0) | None => None,
            Some(m) => Some(m),
        }
    }

    /// Returns true if a tag filter is active.
    #[must_use]
    pub fn has_tag_filter(&self) -> bool {
        !self.selected_tags.is_empty()
    }

    /// Returns true if neither dimension constrains the pick.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.time_budget().is_none() && !self.has_tag_filter()
    }
}

/// Builder for [`SelectionRequest`].
///
/// # Example
/// ```
/// use make_a_decision::SelectionRequest;
///
/// let request = SelectionRequest::builder()
///     .time_budget(1, 30)
///     .tag(" Outdoor ")
///     .build();
/// assert_eq!(request.time_budget(), Some(90));
/// assert!(request.selected_tags.contains("outdoor"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectionRequestBuilder {
    time_constraint_minutes: Option<u32>,
    selected_tags: TagSet,
}

impl SelectionRequestBuilder {
    /// Creates a new builder with no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the budget from hours and minutes. A non-positive total clears it.
    #[must_use]
    pub fn time_budget(self, hours: i64, minutes: i64) -> Self {
        self.time_constraint_minutes(hours.saturating_mul(60).saturating_add(minutes))
    }

    /// Set the budget in minutes. A non-positive value clears it.
    #[must_use]
    pub fn time_constraint_minutes(mut self, minutes: i64) -> Self {
        self.time_constraint_minutes = if minutes > 0 {
            Some(u32::try_from(minutes).unwrap_or(u32::MAX))
        } else {
            None
        };
        self
    }

    /// Add one tag to the filter. Blank tags are ignored.
    #[must_use]
    pub fn tag(mut self, tag: &str) -> Self {
        if let Some(tag) = normalize_tag(tag) {
            self.selected_tags.insert(tag);
        }
        self
    }

    /// Add several tags to the filter.
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            self = self.tag(tag.as_ref());
        }
        self
    }

    /// Build the request.
    #[must_use]
    pub fn build(self) -> SelectionRequest {
        SelectionRequest {
            time_constraint_minutes: self.time_constraint_minutes,
            selected_tags: self.selected_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_combines_hours_and_minutes() {
        let req = SelectionRequest::builder().time_budget(2, 15).build();
        assert_eq!(req.time_budget(), Some(135));
    }

    #[test]
    fn non_positive_budget_is_no_constraint() {
        let req = SelectionRequest::builder().time_budget(0, 0).build();
        assert_eq!(req.time_budget(), None);
        let req = SelectionRequest::builder().time_constraint_minutes(-5).build();
        assert_eq!(req.time_budget(), None);
        assert!(req.is_unconstrained());

        // A deserialized zero is also ignored.
        let req: SelectionRequest =
            serde_json::from_str(r#"{"time_constraint_minutes":0}"#).unwrap();
        assert_eq!(req.time_budget(), None);
    }

    #[test]
    fn deserialized_negative_budget_is_no_constraint() {
        let req: SelectionRequest =
            serde_json::from_str(r#"{"time_constraint_minutes":-5}"#).unwrap();
        assert_eq!(req.time_constraint_minutes, None);
        assert!(req.is_unconstrained());

        let req: SelectionRequest =
            serde_json::from_str(r#"{"time_constraint_minutes":null,"selected_tags":["Calm"]}"#)
                .unwrap();
        assert_eq!(req.time_budget(), None);
        assert!(req.selected_tags.contains("calm"));

        let req: SelectionRequest =
            serde_json::from_str(r#"{"time_constraint_minutes":45}"#).unwrap();
        assert_eq!(req.time_budget(), Some(45));

        let req: SelectionRequest =
            serde_json::from_str(r#"{"time_constraint_minutes":99999999999}"#).unwrap();
        assert_eq!(req.time_budget(), Some(u32::MAX));
    }

    #[test]
    fn form_parsing_treats_garbage_as_zero() {
        let req = SelectionRequest::from_form("x", "45", ["Indoor", " ", "indoor"]);
        assert_eq!(req.time_budget(), Some(45));
        assert_eq!(req.selected_tags.len(), 1);
        assert!(req.has_tag_filter());

        let req = SelectionRequest::from_form("", "", Vec::<String>::new());
        assert!(req.is_unconstrained());
    }

    #[test]
    fn tags_are_normalized_on_entry() {
        let req = SelectionRequest::builder().tags(["  CALM", "calm", ""]).build();
        let tags: Vec<_> = req.selected_tags.iter().map(|t| t.as_str()).collect();
        assert_eq!(tags, ["calm"]);
    }
}
