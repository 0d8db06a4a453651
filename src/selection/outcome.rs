//! Terminal results of one pick.

use serde::{Deserialize, Serialize};

use crate::option::DecisionOption;
use crate::selection::filter::FilterDiagnosis;
use crate::selection::probability::ProbabilityReport;

/// Lifecycle of a single evaluation.
///
/// `NotEvaluated` moves to exactly one terminal state and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeState {
    /// The engine has not run yet.
    NotEvaluated,
    /// The catalog was empty.
    NoOptionsAtAll,
    /// Every option was filtered out.
    NoEligibleAfterFilter,
    /// One option was chosen.
    Picked,
}

impl OutcomeState {
    /// Returns true for every state except `NotEvaluated`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::NotEvaluated)
    }
}

/// What the engine decided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// An option was chosen.
    Picked {
        /// The chosen option.
        option: DecisionOption,
        /// Its share of the full catalog weight.
        probability: ProbabilityReport,
    },
    /// The catalog has options but none passed the filter.
    NoEligibleAfterFilter {
        /// Which rules rejected what.
        diagnosis: FilterDiagnosis,
    },
    /// The catalog is empty.
    NoOptionsAtAll,
}

impl SelectionOutcome {
    /// The terminal state this outcome represents.
    #[must_use]
    pub const fn state(&self) -> OutcomeState {
        match self {
            Self::Picked { .. } => OutcomeState::Picked,
            Self::NoEligibleAfterFilter { .. } => OutcomeState::NoEligibleAfterFilter,
            Self::NoOptionsAtAll => OutcomeState::NoOptionsAtAll,
        }
    }

    /// Returns true if an option was chosen.
    #[must_use]
    pub const fn is_picked(&self) -> bool {
        matches!(self, Self::Picked { .. })
    }

    /// The chosen option, if any.
    #[must_use]
    pub const fn picked_option(&self) -> Option<&DecisionOption> {
        match self {
            Self::Picked { option, .. } => Some(option),
            _ => None,
        }
    }

    /// Displayed probability of the chosen option, if any.
    #[must_use]
    pub fn probability(&self) -> Option<f64> {
        match self {
            Self::Picked { probability, .. } => Some(probability.probability),
            _ => None,
        }
    }

    /// The filter diagnosis when nothing was eligible.
    #[must_use]
    pub const fn diagnosis(&self) -> Option<&FilterDiagnosis> {
        match self {
            Self::NoEligibleAfterFilter { diagnosis } => Some(diagnosis),
            _ => None,
        }
    }

    /// One-line summary for a presenter.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Picked {
                option,
                probability,
            } => match option.duration_minutes {
                Some(minutes) => format!(
                    "{} ({minutes} min, {:.1}% chance)",
                    option.name,
                    probability.percent()
                ),
                None => format!("{} ({:.1}% chance)", option.name, probability.percent()),
            },
            Self::NoEligibleAfterFilter { diagnosis } => diagnosis.describe(),
            Self::NoOptionsAtAll => "No options available. Add some options first.".to_string(),
        }
    }
}
