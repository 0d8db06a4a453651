//! The selection engine.
//!
//! One evaluation takes a read-only [`CatalogSnapshot`], a
//! [`SelectionRequest`] and a [`RandomSource`], and produces exactly one
//! [`SelectionOutcome`]:
//!
//! 1. An empty catalog is [`SelectionOutcome::NoOptionsAtAll`].
//! 2. Otherwise the [filter](filter::evaluate) reduces the catalog to the
//!    eligible subset. An empty subset is
//!    [`SelectionOutcome::NoEligibleAfterFilter`] with a diagnosis.
//! 3. Otherwise the [sampler](sampler::pick_weighted) chooses one eligible
//!    option, and its [probability](probability::ProbabilityReport) is
//!    reported over the full catalog.
//!
//! The engine performs no I/O, holds no state between calls and never fails.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use make_a_decision::{
//!     select, CatalogSnapshot, OptionDraft, OptionId, SelectionRequest, UserId,
//! };
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let user = UserId::new(1);
//! let options = vec![
//!     OptionDraft::new(user, "Reading").into_option(OptionId::new(1), Utc::now()),
//! ];
//! let snapshot = CatalogSnapshot::new(user, options, Utc::now());
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let outcome = select(&snapshot, &SelectionRequest::unconstrained(), &mut rng);
//! assert_eq!(outcome.picked_option().unwrap().name, "Reading");
//! assert_eq!(outcome.probability(), Some(1.0));
//! ```

pub mod filter;
pub mod outcome;
pub mod probability;
pub mod request;
pub mod sampler;

use tracing::debug;

use crate::option::DecisionOption;
use crate::snapshot::CatalogSnapshot;

pub use filter::{evaluate, ExclusionCause, FilterDiagnosis, FilterEvaluation};
pub use outcome::{OutcomeState, SelectionOutcome};
pub use probability::{catalog_weight, ProbabilityReport};
pub use request::{SelectionRequest, SelectionRequestBuilder};
pub use sampler::{pick_weighted, RandomSource, Weighted};

/// Runs one evaluation against a snapshot.
pub fn select<R: RandomSource + ?Sized>(
    snapshot: &CatalogSnapshot,
    request: &SelectionRequest,
    rng: &mut R,
) -> SelectionOutcome {
    select_from(snapshot.options(), request, rng)
}

/// Runs one evaluation against a plain option list.
pub fn select_from<R: RandomSource + ?Sized>(
    options: &[DecisionOption],
    request: &SelectionRequest,
    rng: &mut R,
) -> SelectionOutcome {
    if options.is_empty() {
        debug!("pick requested on empty catalog");
        return SelectionOutcome::NoOptionsAtAll;
    }

    let FilterEvaluation {
        eligible,
        diagnosis,
    } = filter::evaluate(options, request);

    let Some(chosen) = pick_weighted(&eligible, rng) else {
        debug!(
            considered = diagnosis.considered,
            rejected_by_time = diagnosis.rejected_by_time,
            rejected_by_tags = diagnosis.rejected_by_tags,
            "no eligible options after filter"
        );
        return SelectionOutcome::NoEligibleAfterFilter { diagnosis };
    };

    let probability = ProbabilityReport::for_option(options, chosen.id);
    debug!(
        option_id = %chosen.id,
        eligible = diagnosis.eligible,
        total_weight = probability.total_weight,
        probability = probability.probability,
        "option picked"
    );

    SelectionOutcome::Picked {
        option: chosen.clone(),
        probability,
    }
}
