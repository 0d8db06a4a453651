//! Catalog management: the write side of a user's option list.
//!
//! Every operation requires a signed-in [`Identity`] and is scoped to that
//! user's options; ids belonging to someone else behave as missing. Input is
//! validated here so the selection engine can assume well-formed options.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DecisionConfig;
use crate::error::{DecisionResult, ExecutionError, ValidationError};
use crate::option::{validate_duration, DecisionOption, OptionDraft, OptionId, Weight};
use crate::selection::{catalog_weight, ProbabilityReport};
use crate::session::Identity;
use crate::snapshot::CatalogSnapshot;
use crate::storage::OptionStore;
use crate::tags::{normalize_tags, parse_tag_list, Tag};

/// Hours accepted by [`DetailsUpdate`].
const MAX_DETAIL_HOURS: i64 = 24;
/// Minutes accepted by [`DetailsUpdate`].
const MAX_DETAIL_MINUTES: i64 = 59;

/// Full edit of one option, as submitted by the details form.
///
/// Unlike the single-field operations, out-of-range numbers are clamped
/// rather than rejected: hours to `0..=24`, minutes to `0..=59`, weight to
/// `1..=10`. The combined duration is capped at the configured maximum and
/// a zero total clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsUpdate {
    /// New display name; trimmed and validated.
    pub name: String,
    /// Hours part of the duration.
    pub hours: i64,
    /// Minutes part of the duration.
    pub minutes: i64,
    /// New weight, clamped into range.
    pub weight: i64,
    /// Comma-separated tag input; replaces the current tags.
    pub tags: String,
}

impl DetailsUpdate {
    /// Parses raw form fields. Unparsable hours/minutes become 0 and an
    /// unparsable weight becomes 1.
    #[must_use]
    pub fn from_form(name: &str, hours: &str, minutes: &str, weight: &str, tags: &str) -> Self {
        Self {
            name: name.to_string(),
            hours: hours.trim().parse().unwrap_or(0),
            minutes: minutes.trim().parse().unwrap_or(0),
            weight: weight.trim().parse().unwrap_or(1),
            tags: tags.to_string(),
        }
    }

    fn duration_minutes(&self, max: u32) -> Option<u32> {
        let hours = self.hours.clamp(0, MAX_DETAIL_HOURS);
        let minutes = self.minutes.clamp(0, MAX_DETAIL_MINUTES);
        let total = (hours * 60 + minutes).min(i64::from(max));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total = (total > 0).then_some(total as u32);
        total
    }
}

/// An option kept in browser storage before the user signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOption {
    /// Option name as typed.
    pub text: String,
    /// Weight; missing means 1.
    #[serde(default)]
    pub weight: Option<i64>,
    /// Duration in minutes; missing means flexible.
    #[serde(default)]
    pub duration: Option<i64>,
    /// Raw tag strings, normalized on import.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Result of a [`Catalog::sync_local_options`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Rows stored.
    pub synced: usize,
    /// Rows rejected or failed.
    pub skipped: usize,
    /// Ids of the stored rows, in input order.
    pub created: Vec<OptionId>,
}

/// One row of the management list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionView {
    /// The stored option.
    #[serde(flatten)]
    pub option: DecisionOption,
    /// Unconditional chance of this option in the whole catalog.
    pub probability: f64,
}

/// The user's whole catalog with display odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogView {
    /// Rows in creation order.
    pub options: Vec<OptionView>,
    /// Sum of all weights.
    pub total_weight: u64,
}

impl CatalogView {
    /// Builds the view from a full option list.
    #[must_use]
    pub fn from_options(options: Vec<DecisionOption>) -> Self {
        let total_weight = catalog_weight(&options);
        let options = options
            .into_iter()
            .map(|option| {
                let weight = u64::from(option.weight.get());
                OptionView {
                    probability: ProbabilityReport::from_weights(weight, total_weight).probability,
                    option,
                }
            })
            .collect();
        Self {
            options,
            total_weight,
        }
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if the catalog has no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Validated CRUD over one store.
#[derive(Clone)]
pub struct Catalog {
    options: Arc<dyn OptionStore>,
    config: DecisionConfig,
}

impl Catalog {
    /// Create a catalog over a store with the given limits.
    #[must_use]
    pub fn new(options: Arc<dyn OptionStore>, config: DecisionConfig) -> Self {
        Self { options, config }
    }

    /// Add an option with the default weight.
    ///
    /// `tags` is comma-separated form input; tags beyond the per-option
    /// limit are dropped.
    ///
    /// # Errors
    /// - `Unauthorized` for an anonymous identity
    /// - `EmptyOptionName` / `FieldTooLong` for a bad name
    /// - `DurationOutOfRange` if `duration_minutes` is outside `0..=1440`
    pub fn add_option(
        &self,
        identity: &Identity,
        name: &str,
        duration_minutes: Option<i64>,
        tags: &str,
    ) -> DecisionResult<DecisionOption> {
        let user_id = identity.require_user()?;
        let name = self.validate_name(name)?;

        let mut draft = OptionDraft::new(user_id, name)
            .tags(parse_tag_list(tags, self.config.max_tags_per_option));
        if let Some(minutes) = duration_minutes {
            draft = draft.duration_minutes(validate_duration(minutes, self.config.max_duration_minutes)?);
        }

        let option = self.options.create(draft)?;
        info!(
            user_id = %user_id,
            option_id = %option.id,
            duration = ?option.duration_minutes,
            tags = option.tags.len(),
            "option created"
        );
        Ok(option)
    }

    /// Change an option's display name.
    ///
    /// # Errors
    /// - `Unauthorized` for an anonymous identity
    /// - `EmptyOptionName` / `FieldTooLong` for a bad name
    /// - `OptionNotFound` if the user has no such option
    pub fn rename_option(
        &self,
        identity: &Identity,
        id: OptionId,
        name: &str,
    ) -> DecisionResult<DecisionOption> {
        identity.require_user()?;
        let name = self.validate_name(name)?;
        self.modify(identity, id, |option| {
            option.name = name;
        })
        .inspect(|option| info!(option_id = %option.id, "option renamed"))
    }

    /// Set or clear an option's duration.
    ///
    /// # Errors
    /// - `Unauthorized` for an anonymous identity
    /// - `DurationOutOfRange` if the value is outside `0..=1440`
    /// - `OptionNotFound` if the user has no such option
    pub fn set_duration(
        &self,
        identity: &Identity,
        id: OptionId,
        duration_minutes: Option<i64>,
    ) -> DecisionResult<DecisionOption> {
        identity.require_user()?;
        let duration = duration_minutes
            .map(|m| validate_duration(m, self.config.max_duration_minutes))
            .transpose()?;
        self.modify(identity, id, |option| {
            option.duration_minutes = duration;
        })
        .inspect(|option| {
            info!(option_id = %option.id, duration = ?option.duration_minutes, "duration updated");
        })
    }

    /// Raise the weight by one, stopping at the maximum.
    ///
    /// # Errors
    /// `Unauthorized` or `OptionNotFound`.
    pub fn increase_weight(&self, identity: &Identity, id: OptionId) -> DecisionResult<DecisionOption> {
        self.modify(identity, id, |option| {
            option.weight = option.weight.increased();
        })
        .inspect(|option| info!(option_id = %option.id, weight = %option.weight, "weight increased"))
    }

    /// Lower the weight by one, stopping at the minimum.
    ///
    /// # Errors
    /// `Unauthorized` or `OptionNotFound`.
    pub fn decrease_weight(&self, identity: &Identity, id: OptionId) -> DecisionResult<DecisionOption> {
        self.modify(identity, id, |option| {
            option.weight = option.weight.decreased();
        })
        .inspect(|option| info!(option_id = %option.id, weight = %option.weight, "weight decreased"))
    }

    /// Replace name, duration, weight and tags in one step.
    ///
    /// # Errors
    /// - `Unauthorized` for an anonymous identity
    /// - `EmptyOptionName` / `FieldTooLong` for a bad name
    /// - `OptionNotFound` if the user has no such option
    pub fn update_details(
        &self,
        identity: &Identity,
        id: OptionId,
        update: &DetailsUpdate,
    ) -> DecisionResult<DecisionOption> {
        identity.require_user()?;
        let name = self.validate_name(&update.name)?;
        let duration = update.duration_minutes(self.config.max_duration_minutes);
        let weight = Weight::clamped(update.weight);
        let tags = parse_tag_list(&update.tags, self.config.max_tags_per_option);

        self.modify(identity, id, |option| {
            option.name = name;
            option.duration_minutes = duration;
            option.weight = weight;
            option.tags = tags;
        })
        .inspect(|option| {
            info!(
                option_id = %option.id,
                duration = ?option.duration_minutes,
                weight = %option.weight,
                tags = option.tags.len(),
                "option updated"
            );
        })
    }

    /// Delete an option.
    ///
    /// # Errors
    /// `Unauthorized`, `OptionNotFound`, or a storage failure.
    pub fn delete_option(&self, identity: &Identity, id: OptionId) -> DecisionResult<()> {
        let user_id = identity.require_user()?;
        self.load(identity, id)?;
        self.options.delete(user_id, id)?;
        info!(user_id = %user_id, option_id = %id, "option deleted");
        Ok(())
    }

    /// Get one option.
    ///
    /// # Errors
    /// `Unauthorized` or `OptionNotFound`.
    pub fn get_option(&self, identity: &Identity, id: OptionId) -> DecisionResult<DecisionOption> {
        self.load(identity, id)
    }

    /// The user's options in creation order, with display odds.
    ///
    /// # Errors
    /// `Unauthorized`, or a storage failure.
    pub fn list_options(&self, identity: &Identity) -> DecisionResult<CatalogView> {
        let user_id = identity.require_user()?;
        Ok(CatalogView::from_options(self.options.list_for_user(user_id)?))
    }

    /// Distinct tags in use across the user's options, sorted.
    ///
    /// # Errors
    /// `Unauthorized`, or a storage failure.
    pub fn all_tags(&self, identity: &Identity) -> DecisionResult<Vec<Tag>> {
        let user_id = identity.require_user()?;
        Ok(self.options.tags_for_user(user_id)?)
    }

    /// Read-only copy of the user's catalog for one pick.
    ///
    /// # Errors
    /// `Unauthorized`, or a storage failure.
    pub fn snapshot(&self, identity: &Identity, now: DateTime<Utc>) -> DecisionResult<CatalogSnapshot> {
        let user_id = identity.require_user()?;
        Ok(CatalogSnapshot::capture(self.options.as_ref(), user_id, now)?)
    }

    /// Import options collected while signed out.
    ///
    /// Rows with a blank name or an out-of-range duration are skipped;
    /// weights are clamped and tags beyond the limit are dropped. A store
    /// failure on one row skips that row and continues.
    ///
    /// # Errors
    /// `Unauthorized` for an anonymous identity.
    pub fn sync_local_options(
        &self,
        identity: &Identity,
        rows: Vec<LocalOption>,
    ) -> DecisionResult<SyncReport> {
        let user_id = identity.require_user()?;
        let mut report = SyncReport::default();

        for row in rows {
            let name = match self.validate_name(&row.text) {
                Ok(name) => name,
                Err(e) => {
                    warn!(error = %e, "skipping local option with invalid name");
                    report.skipped += 1;
                    continue;
                }
            };

            let mut draft = OptionDraft::new(user_id, name).weight(Weight::clamped(row.weight.unwrap_or(1)));
            if let Some(minutes) = row.duration {
                match validate_duration(minutes, self.config.max_duration_minutes) {
                    Ok(minutes) => draft = draft.duration_minutes(minutes),
                    Err(e) => {
                        warn!(error = %e, "skipping local option with invalid duration");
                        report.skipped += 1;
                        continue;
                    }
                }
            }
            let mut tags = normalize_tags(&row.tags);
            tags.truncate(self.config.max_tags_per_option);
            draft = draft.tags(tags);

            match self.options.create(draft) {
                Ok(option) => {
                    report.synced += 1;
                    report.created.push(option.id);
                }
                Err(e) => {
                    warn!(error = %e, "failed to sync local option");
                    report.skipped += 1;
                }
            }
        }

        info!(
            user_id = %user_id,
            synced = report.synced,
            skipped = report.skipped,
            "local options synced"
        );
        Ok(report)
    }

    fn validate_name(&self, raw: &str) -> Result<String, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyOptionName);
        }
        if name.chars().count() > self.config.max_name_len {
            return Err(ValidationError::FieldTooLong {
                field: "name".to_string(),
                max_length: self.config.max_name_len,
            });
        }
        Ok(name.to_string())
    }

    fn load(&self, identity: &Identity, id: OptionId) -> DecisionResult<DecisionOption> {
        let user_id = identity.require_user()?;
        self.options
            .get(user_id, id)?
            .ok_or_else(|| ExecutionError::OptionNotFound { id }.into())
    }

    /// Load, edit and write back one option.
    fn modify<F>(&self, identity: &Identity, id: OptionId, edit: F) -> DecisionResult<DecisionOption>
    where
        F: FnOnce(&mut DecisionOption),
    {
        let mut option = self.load(identity, id)?;
        edit(&mut option);
        option.touch();
        self.options.update(option.clone())?;
        Ok(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::option::UserId;
    use crate::storage::InMemoryOptionStore;

    fn catalog() -> (Catalog, Identity) {
        let store = Arc::new(InMemoryOptionStore::new());
        (
            Catalog::new(store, DecisionConfig::default()),
            Identity::User(UserId::new(1)),
        )
    }

    #[test]
    fn add_option_validates_and_defaults() {
        let (catalog, me) = catalog();
        let option = catalog
            .add_option(&me, "  Reading ", Some(30), "Indoor, calm, indoor")
            .unwrap();
        assert_eq!(option.name, "Reading");
        assert_eq!(option.weight.get(), 1);
        assert_eq!(option.duration_minutes, Some(30));
        assert_eq!(option.tags.len(), 2);

        let err = catalog.add_option(&me, "   ", None, "").unwrap_err();
        assert!(matches!(
            err,
            crate::DecisionError::Validation(ValidationError::EmptyOptionName)
        ));

        let err = catalog.add_option(&me, "Nap", Some(1441), "").unwrap_err();
        assert!(err.is_validation());
        let err = catalog.add_option(&me, "Nap", Some(-1), "").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn add_option_truncates_tags_to_limit() {
        let (catalog, me) = catalog();
        let option = catalog.add_option(&me, "Lots", None, "a,b,c,d,e,f,g").unwrap();
        assert_eq!(option.tags.len(), 5);
        assert!(!option.tags.contains("f"));
    }

    #[test]
    fn anonymous_identity_is_rejected() {
        let (catalog, _) = catalog();
        let err = catalog
            .add_option(&Identity::Anonymous, "Reading", None, "")
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(catalog.list_options(&Identity::Anonymous).unwrap_err().is_unauthorized());
    }

    #[test]
    fn anonymous_edit_is_unauthorized_before_validation() {
        let (catalog, me) = catalog();
        let option = catalog.add_option(&me, "Reading", None, "").unwrap();
        let anon = Identity::Anonymous;

        let err = catalog.rename_option(&anon, option.id, " ").unwrap_err();
        assert!(err.is_unauthorized());

        let blank = DetailsUpdate::from_form("", "1", "0", "3", "");
        let err = catalog.update_details(&anon, option.id, &blank).unwrap_err();
        assert!(err.is_unauthorized());

        let err = catalog.set_duration(&anon, option.id, Some(-1)).unwrap_err();
        assert!(err.is_unauthorized());

        assert_eq!(catalog.get_option(&me, option.id).unwrap().name, "Reading");
    }

    #[test]
    fn weight_steps_saturate() {
        let (catalog, me) = catalog();
        let id = catalog.add_option(&me, "Walk", None, "").unwrap().id;

        assert_eq!(catalog.decrease_weight(&me, id).unwrap().weight.get(), 1);
        for _ in 0..15 {
            catalog.increase_weight(&me, id).unwrap();
        }
        assert_eq!(catalog.get_option(&me, id).unwrap().weight.get(), 10);
        assert_eq!(catalog.decrease_weight(&me, id).unwrap().weight.get(), 9);
    }

    #[test]
    fn rename_and_duration_keep_other_fields() {
        let (catalog, me) = catalog();
        let id = catalog.add_option(&me, "Walk", Some(20), "outdoor").unwrap().id;
        catalog.increase_weight(&me, id).unwrap();

        let renamed = catalog.rename_option(&me, id, "Long walk").unwrap();
        assert_eq!(renamed.name, "Long walk");
        assert_eq!(renamed.weight.get(), 2);
        assert_eq!(renamed.duration_minutes, Some(20));
        assert!(renamed.tags.contains("outdoor"));

        let cleared = catalog.set_duration(&me, id, None).unwrap();
        assert_eq!(cleared.duration_minutes, None);
        assert!(catalog.set_duration(&me, id, Some(2000)).is_err());
    }

    #[test]
    fn update_details_clamps_fields() {
        let (catalog, me) = catalog();
        let id = catalog.add_option(&me, "Walk", Some(20), "outdoor").unwrap().id;

        let update = DetailsUpdate::from_form("Hike", "30", "75", "42", "Trail, Outdoor");
        let option = catalog.update_details(&me, id, &update).unwrap();
        assert_eq!(option.name, "Hike");
        assert_eq!(option.duration_minutes, Some(1440));
        assert_eq!(option.weight.get(), 10);
        let tags: Vec<_> = option.tags.iter().map(Tag::as_str).collect();
        assert_eq!(tags, ["trail", "outdoor"]);

        let update = DetailsUpdate::from_form("Hike", "0", "0", "nope", "");
        let option = catalog.update_details(&me, id, &update).unwrap();
        assert_eq!(option.duration_minutes, None);
        assert_eq!(option.weight.get(), 1);
        assert!(option.tags.is_empty());

        let update = DetailsUpdate::from_form(" ", "1", "0", "1", "");
        assert!(catalog.update_details(&me, id, &update).unwrap_err().is_validation());
    }

    #[test]
    fn other_users_options_are_not_found() {
        let (catalog, me) = catalog();
        let id = catalog.add_option(&me, "Mine", None, "").unwrap().id;
        let other = Identity::User(UserId::new(2));

        assert!(catalog.rename_option(&other, id, "Theirs").unwrap_err().is_not_found());
        assert!(catalog.delete_option(&other, id).unwrap_err().is_not_found());
        assert_eq!(catalog.get_option(&me, id).unwrap().name, "Mine");
    }

    #[test]
    fn delete_removes_option() {
        let (catalog, me) = catalog();
        let id = catalog.add_option(&me, "Gone", None, "").unwrap().id;
        catalog.delete_option(&me, id).unwrap();
        assert!(catalog.get_option(&me, id).unwrap_err().is_not_found());
        assert!(catalog.delete_option(&me, id).unwrap_err().is_not_found());
    }

    #[test]
    fn list_reports_unconditional_probability() {
        let (catalog, me) = catalog();
        let a = catalog.add_option(&me, "A", None, "").unwrap().id;
        catalog.add_option(&me, "B", None, "").unwrap();
        catalog.increase_weight(&me, a).unwrap();
        catalog.increase_weight(&me, a).unwrap();

        let view = catalog.list_options(&me).unwrap();
        assert_eq!(view.total_weight, 4);
        assert_eq!(view.len(), 2);
        assert!((view.options[0].probability - 0.75).abs() < 1e-12);
        assert!((view.options[1].probability - 0.25).abs() < 1e-12);
    }

    #[test]
    fn sync_skips_invalid_rows_and_clamps() {
        let (catalog, me) = catalog();
        let rows: Vec<LocalOption> = serde_json::from_str(
            r#"[
                {"text": "Read", "weight": 0, "duration": 30, "tags": ["Indoor"]},
                {"text": "  ", "weight": 3},
                {"text": "Nap", "weight": 50, "duration": 5000},
                {"text": "Walk", "weight": 15, "tags": ["a","b","c","d","e","f"]},
                {"text": "Cook"}
            ]"#,
        )
        .unwrap();

        let report = catalog.sync_local_options(&me, rows).unwrap();
        assert_eq!(report.synced, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.created.len(), 3);

        let view = catalog.list_options(&me).unwrap();
        let read = &view.options[0].option;
        assert_eq!(read.weight.get(), 1);
        assert!(read.tags.contains("indoor"));
        let walk = &view.options[1].option;
        assert_eq!(walk.weight.get(), 10);
        assert_eq!(walk.tags.len(), 5);
        assert_eq!(view.options[2].option.weight.get(), 1);
    }

    #[test]
    fn all_tags_are_sorted_and_distinct() {
        let (catalog, me) = catalog();
        catalog.add_option(&me, "A", None, "zen, indoor").unwrap();
        catalog.add_option(&me, "B", None, "indoor, active").unwrap();
        let tags: Vec<String> = catalog
            .all_tags(&me)
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tags, ["active", "indoor", "zen"]);
    }
}
