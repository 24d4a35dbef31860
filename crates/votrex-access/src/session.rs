//! Per-view session state
//!
//! Each gate or router owns one [`SessionTracker`]. Starting a resolution
//! bumps the epoch and hands out a [`Ticket`]; a result is applied only while
//! its ticket is still the newest one. A slow resolution for an identity that
//! is no longer connected is therefore dropped instead of overwriting the
//! state of the identity that replaced it.

use crate::error::ResolveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;
use votrex_types::{OrgId, Role, WalletAddress};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Pending,
    Resolved,
    Failed,
}

/// Cloneable summary of a [`ResolveError`] kept in the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFailure {
    OrganizationNotFound(OrgId),
    Remote(String),
}

impl From<&ResolveError> for SessionFailure {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::OrganizationNotFound(org_id) => {
                SessionFailure::OrganizationNotFound(org_id.clone())
            }
            ResolveError::Remote(cause) => SessionFailure::Remote(cause.to_string()),
        }
    }
}

/// Identity, role and resolution status of one view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub epoch: u64,
    pub identity: Option<WalletAddress>,
    pub role: Option<Role>,
    pub status: ResolutionStatus,
    pub failure: Option<SessionFailure>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            epoch: 0,
            identity: None,
            role: None,
            status: ResolutionStatus::Pending,
            failure: None,
            updated_at: Utc::now(),
        }
    }

    /// Whether a resolution is still outstanding.
    pub fn is_pending(&self) -> bool {
        self.status == ResolutionStatus::Pending
    }
}

/// Proof that a resolution was started, checked again when it settles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    identity: Option<WalletAddress>,
}

impl Ticket {
    /// Epoch this ticket was issued in.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Identity the ticket resolves.
    pub fn identity(&self) -> Option<&WalletAddress> {
        self.identity.as_ref()
    }
}

/// Owner of one view's [`SessionState`]
pub struct SessionTracker {
    state: watch::Sender<SessionState>,
}

impl SessionTracker {
    /// Start in `Pending` at epoch 0 with no identity.
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::initial());
        Self { state }
    }

    /// Enter `Pending` for `identity` and invalidate every earlier ticket.
    pub fn begin(&self, identity: Option<WalletAddress>) -> Ticket {
        let mut epoch = 0;
        self.state.send_modify(|state| {
            state.epoch += 1;
            state.identity = identity.clone();
            state.role = None;
            state.status = ResolutionStatus::Pending;
            state.failure = None;
            state.updated_at = Utc::now();
            epoch = state.epoch;
        });
        Ticket { epoch, identity }
    }

    /// Apply a resolution outcome if `ticket` is still current.
    ///
    /// Returns false, leaving the state untouched, for a superseded ticket.
    pub fn settle(&self, ticket: &Ticket, outcome: &Result<Role, ResolveError>) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if state.epoch != ticket.epoch || state.identity != ticket.identity {
                return false;
            }
            match outcome {
                Ok(role) => {
                    state.role = Some(*role);
                    state.status = ResolutionStatus::Resolved;
                }
                Err(err) => {
                    state.role = None;
                    state.status = ResolutionStatus::Failed;
                    state.failure = Some(SessionFailure::from(err));
                }
            }
            state.updated_at = Utc::now();
            true
        });

        if !applied {
            debug!(epoch = ticket.epoch, "Discarding stale resolution");
        }
        applied
    }

    /// Whether no newer resolution has begun since `ticket`.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.state.borrow().epoch == ticket.epoch
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}
