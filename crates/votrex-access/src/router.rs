//! Login routing

use crate::error::ResolveError;
use crate::resolver::RoleResolver;
use crate::session::{SessionState, SessionTracker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, instrument, warn};
use votrex_types::{Notice, OrgId, Role, WalletAddress};

pub const NOTICE_ADMIN: &str = "You are an Admin";
pub const NOTICE_VOTER: &str = "You are a Voter";
pub const NOTICE_SYSTEM_ADMIN: &str = "You are the System Admin";
pub const NOTICE_NO_WALLET: &str = "Error detecting wallet address";
pub const NOTICE_UNKNOWN_ORGANIZATION: &str = "Organization ID does not exist in the system.";
pub const NOTICE_LOGIN_FAILED: &str = "Error during login. Please try again.";

/// Where a caller lands after login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Login,
    AdminDashboard,
    VoterDashboard,
    TokenAdmin,
}

impl Destination {
    /// Route path of the destination view.
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::AdminDashboard => "/admin-dashboard",
            Destination::VoterDashboard => "/voter-dashboard",
            Destination::TokenAdmin => "/tokenTXInterface",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub destination: Destination,
    pub notice: Notice,
    pub role: Option<Role>,
}

impl LoginOutcome {
    /// Map a settled resolution to a destination and notice.
    pub fn from_resolution(outcome: &Result<Role, ResolveError>) -> Self {
        match outcome {
            Ok(role) => {
                let (destination, notice) = match role {
                    Role::OrganizationAdmin => {
                        (Destination::AdminDashboard, Notice::success(NOTICE_ADMIN))
                    }
                    Role::Voter => (Destination::VoterDashboard, Notice::success(NOTICE_VOTER)),
                    Role::SystemAdmin => {
                        (Destination::TokenAdmin, Notice::success(NOTICE_SYSTEM_ADMIN))
                    }
                    Role::Unauthenticated => {
                        (Destination::Login, Notice::error(NOTICE_NO_WALLET))
                    }
                };
                Self {
                    destination,
                    notice,
                    role: Some(*role),
                }
            }
            Err(ResolveError::OrganizationNotFound(_)) => Self {
                destination: Destination::Login,
                notice: Notice::error(NOTICE_UNKNOWN_ORGANIZATION),
                role: None,
            },
            Err(ResolveError::Remote(_)) => Self {
                destination: Destination::Login,
                notice: Notice::error(NOTICE_LOGIN_FAILED),
                role: None,
            },
        }
    }
}

/// Sends a logging-in wallet to the surface matching its role.
pub struct SessionRouter {
    resolver: Arc<RoleResolver>,
    session: SessionTracker,
}

impl SessionRouter {
    /// Create a router with no login in progress.
    pub fn new(resolver: Arc<RoleResolver>) -> Self {
        Self {
            resolver,
            session: SessionTracker::new(),
        }
    }

    /// Resolve `identity` in `org_id` and pick a destination.
    ///
    /// Returns `None` when a later login started before this one settled.
    #[instrument(skip_all, fields(org_id = %org_id))]
    pub async fn login(
        &self,
        identity: Option<WalletAddress>,
        org_id: &OrgId,
    ) -> Option<LoginOutcome> {
        let ticket = self.session.begin(identity);
        let outcome = self.resolver.resolve(ticket.identity(), org_id).await;

        if let Err(err) = &outcome {
            warn!(error = %err, "Login resolution failed");
        }
        if !self.session.settle(&ticket, &outcome) {
            return None;
        }

        let login = LoginOutcome::from_resolution(&outcome);
        info!(destination = %login.destination, "Login routed");
        Some(login)
    }

    /// Snapshot of the login session.
    pub fn session(&self) -> SessionState {
        self.session.current()
    }

    /// Watch login session transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }
}
