//! # make-a-decision - constrained weighted-random picks
//!
//! Users keep a personal catalog of options (activities). Each option has a
//! weight, an optional duration and a few tags. A pick narrows the catalog by
//! a time budget and a tag filter, then chooses one survivor at random with
//! probability proportional to its weight.
//!
//! ## Core Concepts
//!
//! - **Option**: a user-defined activity with weight 1-10, optional duration
//!   and up to five normalized tags
//! - **Snapshot**: a read-only copy of one user's catalog taken per request
//! - **Selection engine**: filter, weighted sampler and probability reporter,
//!   pure apart from the injected random source
//! - **Outcome**: `Picked`, `NoEligibleAfterFilter` or `NoOptionsAtAll`
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use make_a_decision::{DecisionConfig, DecisionService, Identity, SelectionRequest};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let service = DecisionService::in_memory(DecisionConfig::default())?;
//! let user = service.accounts().register("sam@example.com", "hash")?;
//! let me = Identity::User(user.id);
//!
//! service.catalog().add_option(&me, "Reading", Some(30), "indoor")?;
//! service.catalog().add_option(&me, "Running", None, "active")?;
//!
//! let request = SelectionRequest::builder().time_budget(0, 20).build();
//! let mut rng = StdRng::seed_from_u64(42);
//! let outcome = service.pick(&me, &request, Utc::now(), &mut rng)?;
//! assert_eq!(outcome.picked_option().unwrap().name, "Running");
//! # Ok::<(), make_a_decision::DecisionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod config;
pub mod error;
pub mod option;
pub mod snapshot;
pub mod tags;

// Engine
pub mod selection;

// Collaborators
pub mod catalog;
pub mod service;
pub mod session;
pub mod storage;
pub mod user;

pub use catalog::{Catalog, CatalogView, DetailsUpdate, LocalOption, OptionView, SyncReport};
pub use config::{DecisionConfig, SessionConfig};
pub use error::{DecisionError, DecisionResult, ExecutionError, ValidationError};
pub use option::{DecisionOption, OptionDraft, OptionId, UserId, Weight, MAX_DURATION_MINUTES};
pub use selection::{
    select, select_from, ExclusionCause, FilterDiagnosis, OutcomeState, ProbabilityReport,
    RandomSource, SelectionOutcome, SelectionRequest, SelectionRequestBuilder, Weighted,
};
pub use service::DecisionService;
pub use session::{ClientInfo, Identity, IssuedSession, Session, SessionManager, SessionResolution};
pub use snapshot::CatalogSnapshot;
pub use storage::{
    InMemoryOptionStore, InMemorySessionStore, InMemoryStores, InMemoryUserStore, OptionStore,
    SessionStore, StorageError, UserStore,
};
pub use tags::{normalize_tag, normalize_tags, parse_tag_list, Tag, TagSet, MAX_TAGS_PER_OPTION};
pub use user::{Accounts, User};
