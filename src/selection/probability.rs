//! Displayed odds for a pick.
//!
//! The reported probability is the chosen option's share of the user's whole
//! catalog weight, not its conditional probability under the active filter.

use serde::{Deserialize, Serialize};

use crate::option::{DecisionOption, OptionId};
use crate::selection::sampler::Weighted;

/// Sum of weights across a full catalog.
#[must_use]
pub fn catalog_weight(catalog: &[DecisionOption]) -> u64 {
    catalog
        .iter()
        .fold(0u64, |acc, option| acc.saturating_add(option.weight()))
}

/// Weight share of one option within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityReport {
    /// Weight of the chosen option; 0 if it was not in the catalog.
    pub option_weight: u64,
    /// Sum of all weights in the catalog.
    pub total_weight: u64,
    /// `option_weight / total_weight`, in `[0, 1]`.
    pub probability: f64,
}

impl ProbabilityReport {
    /// Computes the report from raw weights. A zero total yields 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_weights(option_weight: u64, total_weight: u64) -> Self {
        let probability = if total_weight == 0 {
            0.0
        } else {
            option_weight as f64 / total_weight as f64
        };
        Self {
            option_weight,
            total_weight,
            probability,
        }
    }

    /// Computes the share of option `id` over every option in `catalog`.
    #[must_use]
    pub fn for_option(catalog: &[DecisionOption], id: OptionId) -> Self {
        let option_weight = catalog
            .iter()
            .find(|o| o.id == id)
            .map_or(0, |o| o.weight());
        Self::from_weights(option_weight, catalog_weight(catalog))
    }

    /// Probability as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}
