//! Service facade wiring stores, configuration and the selection engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::DecisionConfig;
use crate::error::{DecisionResult, ExecutionError};
use crate::selection::{self, RandomSource, SelectionOutcome, SelectionRequest};
use crate::session::{ClientInfo, Identity, IssuedSession, SessionManager};
use crate::storage::{InMemoryStores, OptionStore, SessionStore, UserStore};
use crate::user::{Accounts, User};

/// Everything a request handler needs.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use make_a_decision::{DecisionConfig, DecisionService, Identity, SelectionRequest};
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
///
/// let service = DecisionService::in_memory(DecisionConfig::default()).unwrap();
/// let user = service.accounts().register("ada@example.com", "hash").unwrap();
/// let me = Identity::User(user.id);
///
/// service.catalog().add_option(&me, "Reading", Some(30), "indoor").unwrap();
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let outcome = service
///     .pick(&me, &SelectionRequest::unconstrained(), Utc::now(), &mut rng)
///     .unwrap();
/// assert!(outcome.is_picked());
/// ```
#[derive(Clone)]
pub struct DecisionService {
    config: DecisionConfig,
    catalog: Catalog,
    sessions: SessionManager,
    accounts: Accounts,
}

impl DecisionService {
    /// Wire a service over the given stores.
    ///
    /// # Errors
    /// Returns a validation error if `config` is inconsistent.
    pub fn new(
        options: Arc<dyn OptionStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        config: DecisionConfig,
    ) -> DecisionResult<Self> {
        config.validate()?;
        Ok(Self {
            catalog: Catalog::new(options, config.clone()),
            sessions: SessionManager::new(sessions, users.clone(), &config.session),
            accounts: Accounts::new(users),
            config,
        })
    }

    /// Wire a service over fresh in-memory stores.
    ///
    /// # Errors
    /// Returns a validation error if `config` is inconsistent.
    pub fn in_memory(config: DecisionConfig) -> DecisionResult<Self> {
        Self::with_stores(&InMemoryStores::new(), config)
    }

    /// Wire a service over an existing in-memory bundle, so callers can keep
    /// a handle on the stores.
    ///
    /// # Errors
    /// Returns a validation error if `config` is inconsistent.
    pub fn with_stores(stores: &InMemoryStores, config: DecisionConfig) -> DecisionResult<Self> {
        Self::new(
            stores.options.clone(),
            stores.users.clone(),
            stores.sessions.clone(),
            config,
        )
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Catalog operations.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Session issuing and resolution.
    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Account registration and lookup.
    #[must_use]
    pub const fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    /// Pick one option for the signed-in user.
    ///
    /// The catalog is read once; filtering and the reported probability
    /// both use that snapshot.
    ///
    /// # Errors
    /// - `Unauthorized` for an anonymous identity
    /// - storage errors while reading the catalog
    pub fn pick<R: RandomSource + ?Sized>(
        &self,
        identity: &Identity,
        request: &SelectionRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> DecisionResult<SelectionOutcome> {
        let snapshot = self.catalog.snapshot(identity, now)?;
        debug!(
            user_id = %snapshot.user_id(),
            options = snapshot.len(),
            time_budget = ?request.time_budget(),
            tags = request.selected_tags.len(),
            "evaluating pick"
        );
        Ok(selection::select(&snapshot, request, rng))
    }

    /// Create an account and sign it in.
    ///
    /// Password hashing happens before this call; only the hash is stored.
    ///
    /// # Errors
    /// - `InvalidEmail` or `UserAlreadyExists` from registration
    /// - storage errors while writing the user or session
    pub fn sign_up(
        &self,
        email: &str,
        password_hash: &str,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> DecisionResult<(User, IssuedSession)> {
        let user = self.accounts.register(email, password_hash)?;
        let session = self.sessions.issue(user.id, client, now)?;
        Ok((user, session))
    }

    /// Sign in an existing account.
    ///
    /// `verify` receives the stored password hash and decides whether the
    /// presented credentials match it. Unknown emails and failed checks both
    /// yield `Unauthorized`.
    ///
    /// # Errors
    /// `Unauthorized`, or a storage failure.
    pub fn sign_in<F>(
        &self,
        email: &str,
        verify: F,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> DecisionResult<IssuedSession>
    where
        F: FnOnce(&str) -> bool,
    {
        let Some(user) = self.accounts.find_by_email(email)? else {
            debug!("sign-in for unknown email");
            return Err(ExecutionError::Unauthorized.into());
        };
        if !verify(&user.password_hash) {
            debug!(user_id = %user.id, "password check failed");
            return Err(ExecutionError::Unauthorized.into());
        }
        let session = self.sessions.issue(user.id, client, now)?;
        info!(user_id = %user.id, "user signed in");
        Ok(session)
    }

    /// Sign out the session behind `token`.
    ///
    /// # Errors
    /// Storage failures while deleting the session.
    pub fn sign_out(&self, token: &str) -> DecisionResult<()> {
        self.sessions.revoke(token)
    }
}
