//! Sign-in sessions and request identity.
//!
//! A session token is handed to the client once and never stored; the
//! store only keeps its blake3 digest. Resolving a token never fails: any
//! problem degrades the request to [`Identity::Anonymous`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{DecisionResult, ExecutionError};
use crate::option::UserId;
use crate::storage::{SessionStore, UserStore};

/// Who a request is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// No valid session.
    Anonymous,
    /// A signed-in user.
    User(UserId),
}

impl Identity {
    /// Returns the user id, if signed in.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }

    /// Returns the user id or `Unauthorized`.
    ///
    /// # Errors
    /// `Unauthorized` for an anonymous identity.
    pub fn require_user(&self) -> Result<UserId, ExecutionError> {
        match self {
            Self::Anonymous => Err(ExecutionError::Unauthorized),
            Self::User(id) => Ok(*id),
        }
    }
}

/// Stored session row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Hex blake3 digest of the client token.
    pub token_digest: String,
    /// Signed-in user.
    pub user_id: UserId,
    /// Issue time.
    pub created_at: DateTime<Utc>,
    /// Moves forward when the session is refreshed.
    pub expires_at: DateTime<Utc>,
    /// Client user agent at issue time.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Client address at issue time.
    #[serde(default)]
    pub client_ip: Option<String>,
}

impl Session {
    /// Returns true if the session is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Hex blake3 digest of a client token.
#[must_use]
pub fn token_digest(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}

/// Client details recorded alongside a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    /// `User-Agent` header.
    pub user_agent: Option<String>,
    /// Remote address.
    pub client_ip: Option<String>,
    /// Token the client currently holds, replaced by the new session.
    pub current_token: Option<String>,
}

/// A freshly issued session: the only time the raw token is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Raw token for the client cookie; only its digest is stored.
    pub token: String,
    /// Signed-in user.
    pub user_id: UserId,
    /// Cookie expiry.
    pub expires_at: DateTime<Utc>,
}

/// Outcome of resolving a request's session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResolution {
    /// Who the request acts as.
    pub identity: Identity,
    /// Email of the signed-in user, for display.
    pub email: Option<String>,
    /// New expiry if the session was extended; the client cookie should be
    /// re-issued with it.
    pub refreshed_until: Option<DateTime<Utc>>,
    /// The client presented a token that is no longer valid.
    pub clear_cookie: bool,
}

impl SessionResolution {
    fn anonymous(clear_cookie: bool) -> Self {
        Self {
            identity: Identity::Anonymous,
            email: None,
            refreshed_until: None,
            clear_cookie,
        }
    }
}

/// Issues, resolves and revokes sessions.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserStore>,
    ttl: Duration,
    refresh_window: Duration,
}

impl SessionManager {
    /// Create a manager over the given stores.
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            sessions,
            users,
            ttl: config.ttl(),
            refresh_window: config.refresh_window(),
        }
    }

    /// Sign a user in.
    ///
    /// Any token the client already holds is revoked first, and the user's
    /// expired sessions are purged after the new one is stored.
    ///
    /// # Errors
    /// - `UserNotFound` if the account does not exist
    /// - storage failures while writing the session
    pub fn issue(
        &self,
        user_id: UserId,
        client: ClientInfo,
        now: DateTime<Utc>,
    ) -> DecisionResult<IssuedSession> {
        if self.users.get(user_id)?.is_none() {
            return Err(ExecutionError::UserNotFound { id: user_id }.into());
        }

        if let Some(current) = client.current_token.as_deref() {
            if let Err(e) = self.sessions.delete(&token_digest(current)) {
                warn!(error = %e, "failed to delete previous session");
            }
        }

        let token = Uuid::new_v4().to_string();
        let expires_at = now + self.ttl;
        self.sessions.insert(Session {
            token_digest: token_digest(&token),
            user_id,
            created_at: now,
            expires_at,
            user_agent: client.user_agent,
            client_ip: client.client_ip,
        })?;

        match self.sessions.delete_expired_for_user(user_id, now) {
            Ok(0) => {}
            Ok(purged) => debug!(user_id = %user_id, purged, "purged expired sessions"),
            Err(e) => warn!(user_id = %user_id, error = %e, "failed to purge expired sessions"),
        }

        info!(user_id = %user_id, "session issued");
        Ok(IssuedSession {
            token,
            user_id,
            expires_at,
        })
    }

    /// Resolve the token a request presented.
    pub fn resolve(&self, token: Option<&str>, now: DateTime<Utc>) -> SessionResolution {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return SessionResolution::anonymous(false);
        };
        let digest = token_digest(token);

        let session = match self.sessions.get(&digest) {
            Ok(Some(session)) => session,
            Ok(None) => return SessionResolution::anonymous(true),
            Err(e) => {
                error!(error = %e, "failed to get session");
                return SessionResolution::anonymous(true);
            }
        };

        if session.is_expired(now) {
            debug!(user_id = %session.user_id, "session expired");
            if let Err(e) = self.sessions.delete(&digest) {
                warn!(error = %e, "failed to delete expired session");
            }
            return SessionResolution::anonymous(true);
        }

        let mut refreshed_until = None;
        if session.expires_at - now < self.refresh_window {
            let new_expiry = now + self.ttl;
            match self.sessions.update_expiry(&digest, new_expiry) {
                Ok(()) => {
                    debug!(user_id = %session.user_id, "refreshing session");
                    refreshed_until = Some(new_expiry);
                }
                Err(e) => error!(error = %e, "failed to refresh session"),
            }
        }

        let user = match self.users.get(session.user_id) {
            Ok(Some(user)) => user,
            Ok(None) => {
                error!(user_id = %session.user_id, "session references a missing user");
                return SessionResolution::anonymous(false);
            }
            Err(e) => {
                error!(error = %e, "failed to get user");
                return SessionResolution::anonymous(false);
            }
        };

        SessionResolution {
            identity: Identity::User(user.id),
            email: Some(user.email),
            refreshed_until,
            clear_cookie: false,
        }
    }

    /// Sign out: forget the session behind `token`.
    ///
    /// # Errors
    /// Storage failures while deleting the session.
    pub fn revoke(&self, token: &str) -> DecisionResult<()> {
        self.sessions.delete(&token_digest(token))?;
        Ok(())
    }
}
