//! Eligibility filtering.
//!
//! An option is eligible when it passes both the time rule and the tag rule:
//!
//! - **Time**: excluded only if a positive budget is set, the option declares
//!   a duration, and that duration exceeds the budget.
//! - **Tags**: with an empty filter everything passes; otherwise untagged
//!   options pass, and tagged options pass if they share at least one tag
//!   with the filter.

use serde::{Deserialize, Serialize};

use crate::option::DecisionOption;
use crate::selection::request::SelectionRequest;
use crate::tags::TagSet;

/// Time rule for a single option.
#[must_use]
pub fn fits_time_budget(option: &DecisionOption, budget_minutes: Option<u32>) -> bool {
    match (budget_minutes, option.duration_minutes) {
        (Some(budget), Some(duration)) if budget > 0 => duration <= budget,
        _ => true,
    }
}

/// Tag rule for a single option.
#[must_use]
pub fn matches_tags(option: &DecisionOption, selected: &TagSet) -> bool {
    selected.is_empty() || option.tags.is_empty() || option.tags.intersects(selected)
}

/// Which filter dimension emptied the eligible set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionCause {
    /// Only the time budget rejected options.
    TimeBudget,
    /// Only the tag filter rejected options.
    Tags,
    /// Both rules rejected options.
    TimeBudgetAndTags,
}

/// Per-dimension counts from one filter pass.
///
/// Rejection counts are independent: an option failing both rules is
/// counted under both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDiagnosis {
    /// Options in the snapshot.
    pub considered: usize,
    /// Options that passed both rules.
    pub eligible: usize,
    /// Effective budget the pass used.
    pub time_budget_minutes: Option<u32>,
    /// Tag filter the pass used.
    pub selected_tags: TagSet,
    /// Options whose duration exceeded the budget.
    pub rejected_by_time: usize,
    /// Options sharing no tag with the filter.
    pub rejected_by_tags: usize,
}

impl FilterDiagnosis {
    /// Why options were excluded, if any were.
    #[must_use]
    pub const fn cause(&self) -> Option<ExclusionCause> {
        match (self.rejected_by_time > 0, self.rejected_by_tags > 0) {
            (true, true) => Some(ExclusionCause::TimeBudgetAndTags),
            (true, false) => Some(ExclusionCause::TimeBudget),
            (false, true) => Some(ExclusionCause::Tags),
            (false, false) => None,
        }
    }

    /// Human-readable explanation for an empty eligible set.
    #[must_use]
    pub fn describe(&self) -> String {
        let budget = self.time_budget_minutes.unwrap_or(0);
        let tags = self
            .selected_tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        match self.cause() {
            Some(ExclusionCause::TimeBudget) => {
                format!("No options fit within {budget} minutes")
            }
            Some(ExclusionCause::Tags) => format!("No options match the tags: {tags}"),
            Some(ExclusionCause::TimeBudgetAndTags) => {
                format!("No options fit within {budget} minutes and match the tags: {tags}")
            }
            None => "No options available".to_string(),
        }
    }
}

/// Eligible subset of a snapshot plus the diagnosis that produced it.
#[derive(Debug, Clone)]
pub struct FilterEvaluation<'a> {
    /// Eligible options in snapshot order.
    pub eligible: Vec<&'a DecisionOption>,
    /// Counts behind `eligible`.
    pub diagnosis: FilterDiagnosis,
}

/// Runs both rules over `options` in a single pass.
#[must_use]
pub fn evaluate<'a>(options: &'a [DecisionOption], request: &SelectionRequest) -> FilterEvaluation<'a> {
    let budget = request.time_budget();
    let selected = &request.selected_tags;

    let mut diagnosis = FilterDiagnosis {
        considered: options.len(),
        time_budget_minutes: budget,
        selected_tags: selected.clone(),
        ..FilterDiagnosis::default()
    };
    let mut eligible = Vec::with_capacity(options.len());

    for option in options {
        let time_ok = fits_time_budget(option, budget);
        let tags_ok = matches_tags(option, selected);
        if !time_ok {
            diagnosis.rejected_by_time += 1;
        }
        if !tags_ok {
            diagnosis.rejected_by_tags += 1;
        }
        if time_ok && tags_ok {
            eligible.push(option);
        }
    }

    diagnosis.eligible = eligible.len();
    FilterEvaluation {
        eligible,
        diagnosis,
    }
}
