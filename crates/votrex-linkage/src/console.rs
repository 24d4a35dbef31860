//! Token admin console
//!
//! Only the system admin may relink the token contract. The console checks
//! the caller through its own gate on every submission before the mutator is
//! touched.

use crate::mutator::ConfigMutator;
use crate::notice::LinkageNotice;
use std::sync::Arc;
use thiserror::Error;
use tracing::{instrument, warn};
use votrex_access::{AccessGate, DenialReason, GateVerdict, RequiredRoles, RoleResolver};
use votrex_types::{ConfigTarget, Notice, OrgId, WalletAddress};

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Unauthorized: {0}")]
    Unauthorized(DenialReason),

    #[error("Superseded by a newer identity")]
    Superseded,
}

pub struct LinkageConsole {
    gate: AccessGate,
    mutator: Arc<ConfigMutator>,
}

impl LinkageConsole {
    /// `org_id` scopes the role lookup for callers that are not the system
    /// admin; they are denied either way.
    pub fn new(resolver: Arc<RoleResolver>, org_id: OrgId, mutator: Arc<ConfigMutator>) -> Self {
        Self {
            gate: AccessGate::new(resolver, org_id, RequiredRoles::system_admin_only()),
            mutator,
        }
    }

    /// Apply `target` on behalf of `identity` and return the notice to show.
    ///
    /// A failed write is not an error here; it comes back as an error notice.
    #[instrument(skip_all, fields(target = %target.kind()))]
    pub async fn submit(
        &self,
        identity: Option<WalletAddress>,
        target: ConfigTarget,
    ) -> Result<Notice, ConsoleError> {
        match self.gate.refresh(identity).await {
            GateVerdict::Allowed(_) => {}
            GateVerdict::Denied(reason) => {
                warn!(reason = %reason, "Linkage change refused");
                return Err(ConsoleError::Unauthorized(reason));
            }
            GateVerdict::Pending => return Err(ConsoleError::Superseded),
        }

        Ok(match self.mutator.apply(target).await {
            Ok(ack) => Notice::for_ack(&ack),
            Err(err) => Notice::for_mutation_error(&err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::InvalidationBus;
    use votrex_access::AccessConfig;
    use votrex_ledger::InMemoryLedger;
    use votrex_types::{ConfigTargetKind, OrganizationRecord, Role, UserInfo};

    fn console() -> (LinkageConsole, Arc<InMemoryLedger>) {
        let org = OrgId::new("ORG1").unwrap();
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_organization(org.clone(), OrganizationRecord::new("0xABC", 2))
                .with_user("0xABC", UserInfo::admin()),
        );
        let resolver = Arc::new(RoleResolver::new(
            ledger.clone(),
            AccessConfig::default().with_system_admin(WalletAddress::new("0xOWNER")),
        ));
        let mutator = Arc::new(ConfigMutator::new(ledger.clone(), InvalidationBus::new()));
        (LinkageConsole::new(resolver, org, mutator), ledger)
    }

    #[tokio::test]
    async fn test_system_admin_relinks() {
        let (console, ledger) = console();

        let notice = console
            .submit(
                Some(WalletAddress::new("0xowner")),
                ConfigTarget::new(ConfigTargetKind::StakingContract, "0xAAA"),
            )
            .await
            .unwrap();

        assert_eq!(notice.message, "Staking Contract Address set successfully");
        assert_eq!(
            ledger.linkage(ConfigTargetKind::StakingContract),
            Some(WalletAddress::new("0xAAA"))
        );
    }

    #[tokio::test]
    async fn test_organization_admin_is_refused() {
        let (console, ledger) = console();

        let err = console
            .submit(
                Some(WalletAddress::new("0xABC")),
                ConfigTarget::new(ConfigTargetKind::DexContract, "0xAAA"),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConsoleError::Unauthorized(DenialReason::RoleNotPermitted(Role::OrganizationAdmin))
        ));
        assert_eq!(ledger.call_count("setDexContract"), 0);
    }

    #[tokio::test]
    async fn test_rejected_write_becomes_error_notice() {
        let (console, ledger) = console();
        ledger.fail_function("setVotreXContract", "reverted");

        let notice = console
            .submit(
                Some(WalletAddress::new("0xOWNER")),
                ConfigTarget::new(ConfigTargetKind::SystemContract, "0xAAA"),
            )
            .await
            .unwrap();

        assert!(notice.is_error());
        assert_eq!(notice.message, "Error setting VotreX System Contract Address");
    }
}
