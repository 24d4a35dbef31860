//! Access gate for protected views
//!
//! A gate starts in `Pending` and stays there while the caller's role is being
//! resolved. Once the resolution settles the gate either lets the protected
//! view through or denies it. A failed resolution is a denial; there is no
//! separate error surface and no failure ever opens the gate.

use crate::resolver::RoleResolver;
use crate::session::{ResolutionStatus, SessionFailure, SessionState, SessionTracker};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument};
use votrex_types::{Invalidation, OrgId, Role, WalletAddress};

/// Roles admitted by a gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredRoles(HashSet<Role>);

impl RequiredRoles {
    /// Admit exactly `roles`.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// The token admin interface.
    pub fn system_admin_only() -> Self {
        Self::new([Role::SystemAdmin])
    }

    /// Election admin pages.
    pub fn organization_admin() -> Self {
        Self::new([Role::OrganizationAdmin, Role::SystemAdmin])
    }

    /// Pages open to every member of the organization.
    pub fn any_member() -> Self {
        Self::new([Role::Voter, Role::OrganizationAdmin, Role::SystemAdmin])
    }

    /// Whether `role` opens the gate.
    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenialReason {
    RoleNotPermitted(Role),
    OrganizationNotFound(OrgId),
    ResolutionFailed(String),
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::RoleNotPermitted(role) => write!(f, "role {} is not permitted", role),
            DenialReason::OrganizationNotFound(org_id) => {
                write!(f, "organization {} does not exist", org_id)
            }
            DenialReason::ResolutionFailed(cause) => write!(f, "role resolution failed: {}", cause),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateVerdict {
    Pending,
    Allowed(Role),
    Denied(DenialReason),
}

/// What to render in place of a protected view.
#[derive(Debug, PartialEq, Eq)]
pub enum Guarded<V> {
    Pending,
    Denied(DenialReason),
    View(V),
}

/// Gate in front of one protected view
pub struct AccessGate {
    resolver: Arc<RoleResolver>,
    org_id: OrgId,
    required: RequiredRoles,
    session: SessionTracker,
}

impl AccessGate {
    /// Create a closed gate for `org_id`; it stays pending until the first refresh.
    pub fn new(resolver: Arc<RoleResolver>, org_id: OrgId, required: RequiredRoles) -> Self {
        Self {
            resolver,
            org_id,
            required,
            session: SessionTracker::new(),
        }
    }

    /// Organization the gate resolves roles in.
    pub fn org_id(&self) -> &OrgId {
        &self.org_id
    }

    /// Verdict for the current session state.
    pub fn verdict(&self) -> GateVerdict {
        verdict_for(&self.session.current(), &self.required)
    }

    /// Hand out `view` only when the gate is open.
    pub fn guard<V>(&self, view: V) -> Guarded<V> {
        match self.verdict() {
            GateVerdict::Pending => Guarded::Pending,
            GateVerdict::Denied(reason) => Guarded::Denied(reason),
            GateVerdict::Allowed(_) => Guarded::View(view),
        }
    }

    /// Snapshot of the gate's session.
    pub fn session(&self) -> SessionState {
        self.session.current()
    }

    /// Watch session transitions, including `Pending`.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    /// Re-enter `Pending` for `identity`, resolve, and settle unless a newer
    /// refresh started in the meantime.
    ///
    /// Returns the verdict current when this call finishes, which belongs to
    /// the newer identity if this resolution was superseded.
    #[instrument(skip_all, fields(org_id = %self.org_id))]
    pub async fn refresh(&self, identity: Option<WalletAddress>) -> GateVerdict {
        let ticket = self.session.begin(identity);
        let outcome = self.resolver.resolve(ticket.identity(), &self.org_id).await;
        self.session.settle(&ticket, &outcome);
        self.verdict()
    }

    /// Keep the gate in step with the connected wallet.
    ///
    /// A wallet change abandons the in-flight resolution and starts over for
    /// the new identity. An invalidation re-resolves the current identity.
    /// Returns when the wallet feed closes.
    pub async fn run(
        &self,
        mut wallet: watch::Receiver<Option<WalletAddress>>,
        mut invalidations: broadcast::Receiver<Invalidation>,
    ) {
        let mut invalidations_open = true;

        loop {
            let identity = wallet.borrow_and_update().clone();
            let ticket = self.session.begin(identity);
            let resolution = self.resolver.resolve(ticket.identity(), &self.org_id);
            tokio::pin!(resolution);
            let mut settled = false;

            loop {
                tokio::select! {
                    outcome = &mut resolution, if !settled => {
                        self.session.settle(&ticket, &outcome);
                        settled = true;
                    }
                    changed = wallet.changed() => {
                        if changed.is_err() {
                            debug!(org_id = %self.org_id, "Wallet feed closed");
                            return;
                        }
                        break;
                    }
                    event = invalidations.recv(), if invalidations_open => match event {
                        Ok(event) => {
                            info!(target_kind = %event.target, "Linkage changed, re-resolving");
                            break;
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            info!(missed, "Missed invalidations, re-resolving");
                            break;
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            invalidations_open = false;
                        }
                    },
                }
            }
        }
    }
}

fn verdict_for(state: &SessionState, required: &RequiredRoles) -> GateVerdict {
    match state.status {
        ResolutionStatus::Pending => GateVerdict::Pending,
        ResolutionStatus::Resolved => match state.role {
            Some(role) if required.permits(role) => GateVerdict::Allowed(role),
            Some(role) => GateVerdict::Denied(DenialReason::RoleNotPermitted(role)),
            None => GateVerdict::Denied(DenialReason::ResolutionFailed(
                "resolved without a role".into(),
            )),
        },
        ResolutionStatus::Failed => GateVerdict::Denied(match &state.failure {
            Some(SessionFailure::OrganizationNotFound(org_id)) => {
                DenialReason::OrganizationNotFound(org_id.clone())
            }
            Some(SessionFailure::Remote(cause)) => DenialReason::ResolutionFailed(cause.clone()),
            None => DenialReason::ResolutionFailed("unknown failure".into()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccessConfig;
    use votrex_ledger::InMemoryLedger;
    use votrex_types::{OrganizationRecord, UserInfo};

    fn org1() -> OrgId {
        OrgId::new("ORG1").unwrap()
    }

    fn gate(required: RequiredRoles) -> (AccessGate, Arc<InMemoryLedger>) {
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_organization(org1(), OrganizationRecord::new("0xABC", 3))
                .with_user("0xABC", UserInfo::admin()),
        );
        let resolver = Arc::new(RoleResolver::new(
            ledger.clone(),
            AccessConfig::default().with_system_admin(WalletAddress::new("0xOWNER")),
        ));
        (AccessGate::new(resolver, org1(), required), ledger)
    }

    #[test]
    fn test_gate_starts_pending() {
        let (gate, _) = gate(RequiredRoles::any_member());
        assert_eq!(gate.verdict(), GateVerdict::Pending);
        assert_eq!(gate.guard("ballot"), Guarded::Pending);
    }

    #[tokio::test]
    async fn test_admin_passes_admin_gate() {
        let (gate, _) = gate(RequiredRoles::organization_admin());

        let verdict = gate.refresh(Some(WalletAddress::new("0xabc"))).await;

        assert_eq!(verdict, GateVerdict::Allowed(Role::OrganizationAdmin));
        assert_eq!(gate.guard("dashboard"), Guarded::View("dashboard"));
    }

    #[tokio::test]
    async fn test_voter_denied_admin_gate() {
        let (gate, _) = gate(RequiredRoles::organization_admin());

        let verdict = gate.refresh(Some(WalletAddress::new("0xDEF"))).await;

        assert_eq!(
            verdict,
            GateVerdict::Denied(DenialReason::RoleNotPermitted(Role::Voter))
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_denied_member_gate() {
        let (gate, ledger) = gate(RequiredRoles::any_member());

        let verdict = gate.refresh(None).await;

        assert_eq!(
            verdict,
            GateVerdict::Denied(DenialReason::RoleNotPermitted(Role::Unauthenticated))
        );
        assert_eq!(ledger.read_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_fails_closed() {
        let (gate, ledger) = gate(RequiredRoles::any_member());
        ledger.fail_function("organizationData", "rpc down");

        let verdict = gate.refresh(Some(WalletAddress::new("0xabc"))).await;

        assert!(matches!(
            verdict,
            GateVerdict::Denied(DenialReason::ResolutionFailed(_))
        ));
        assert!(matches!(gate.guard(()), Guarded::Denied(_)));
    }

    #[tokio::test]
    async fn test_system_admin_only_gate() {
        let (gate, _) = gate(RequiredRoles::system_admin_only());

        let owner = gate.refresh(Some(WalletAddress::new("0xowner"))).await;
        assert_eq!(owner, GateVerdict::Allowed(Role::SystemAdmin));

        let org_admin = gate.refresh(Some(WalletAddress::new("0xABC"))).await;
        assert_eq!(
            org_admin,
            GateVerdict::Denied(DenialReason::RoleNotPermitted(Role::OrganizationAdmin))
        );
    }
}
