//! Role resolution
//!
//! A role is derived fresh on every request from two ledger reads: the
//! organization record, then the caller's user info. The organization read
//! must succeed and report an existing organization before the user info is
//! requested, since user info only means something inside a valid
//! organization.

use crate::config::AccessConfig;
use crate::error::ResolveError;
use std::sync::Arc;
use tracing::{debug, instrument};
use votrex_ledger::LedgerGateway;
use votrex_types::{OrgId, Role, WalletAddress};

/// Derives a caller's [`Role`] within one organization.
pub struct RoleResolver {
    ledger: Arc<dyn LedgerGateway>,
    config: AccessConfig,
}

impl RoleResolver {
    /// Create a resolver reading from `ledger`.
    pub fn new(ledger: Arc<dyn LedgerGateway>, config: AccessConfig) -> Self {
        Self { ledger, config }
    }

    /// The ledger this resolver reads from.
    pub fn ledger(&self) -> &Arc<dyn LedgerGateway> {
        &self.ledger
    }

    /// Resolve the role of `identity` in `org_id`.
    ///
    /// Organization admin requires both that the identity is the record's
    /// admin address and that its user info carries the admin flag. Either
    /// condition alone yields [`Role::Voter`].
    #[instrument(
        skip_all,
        fields(org_id = %org_id, identity = identity.map(|i| i.normalized()).unwrap_or("-"))
    )]
    pub async fn resolve(
        &self,
        identity: Option<&WalletAddress>,
        org_id: &OrgId,
    ) -> Result<Role, ResolveError> {
        // A blank address is no wallet at all.
        let Some(identity) = identity.filter(|i| !i.is_empty()) else {
            return Ok(Role::Unauthenticated);
        };

        if self.config.is_system_admin(identity) {
            debug!("System admin matched");
            return Ok(Role::SystemAdmin);
        }

        let record = self.ledger.organization_data(org_id).await?;
        if !record.exists {
            debug!("Organization does not exist");
            return Err(ResolveError::OrganizationNotFound(org_id.clone()));
        }

        let user = self.ledger.user_info(identity).await?;

        let role = if record.is_administered_by(identity) && user.is_admin {
            Role::OrganizationAdmin
        } else {
            Role::Voter
        };

        debug!(role = %role, "Role resolved");
        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use votrex_ledger::InMemoryLedger;
    use votrex_types::{OrganizationRecord, UserInfo};

    const OWNER: &str = "0xOWNER";

    fn org1() -> OrgId {
        OrgId::new("ORG1").unwrap()
    }

    fn resolver_with(ledger: Arc<InMemoryLedger>) -> RoleResolver {
        RoleResolver::new(
            ledger,
            AccessConfig::default().with_system_admin(WalletAddress::new(OWNER)),
        )
    }

    fn seeded(admin: &str, user: &str, flag: bool) -> Arc<InMemoryLedger> {
        let info = if flag {
            UserInfo::admin()
        } else {
            UserInfo::member()
        };
        Arc::new(
            InMemoryLedger::new()
                .with_organization(org1(), OrganizationRecord::new(admin, 10))
                .with_user(user, info),
        )
    }

    #[tokio::test]
    async fn test_absent_identity_is_unauthenticated_without_reads() {
        let ledger = seeded("0xABC", "0xABC", true);
        let resolver = resolver_with(ledger.clone());

        let role = resolver.resolve(None, &org1()).await.unwrap();

        assert_eq!(role, Role::Unauthenticated);
        assert_eq!(ledger.read_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_identity_is_unauthenticated_without_reads() {
        let ledger = seeded("0xABC", "0xABC", true);
        let resolver = resolver_with(ledger.clone());

        let role = resolver
            .resolve(Some(&WalletAddress::new("   ")), &org1())
            .await
            .unwrap();

        assert_eq!(role, Role::Unauthenticated);
        assert_eq!(ledger.read_count(), 0);
    }

    #[tokio::test]
    async fn test_system_admin_skips_ledger() {
        let ledger = seeded("0xABC", "0xABC", true);
        let resolver = resolver_with(ledger.clone());

        let role = resolver
            .resolve(Some(&WalletAddress::new("0xowner")), &org1())
            .await
            .unwrap();

        assert_eq!(role, Role::SystemAdmin);
        assert_eq!(ledger.read_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_organization_never_reads_user_info() {
        let ledger = Arc::new(InMemoryLedger::new().with_user("0xABC", UserInfo::admin()));
        let resolver = resolver_with(ledger.clone());

        let err = resolver
            .resolve(Some(&WalletAddress::new("0xABC")), &org1())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::OrganizationNotFound(ref id) if id == &org1()));
        assert_eq!(ledger.call_count("organizationData"), 1);
        assert_eq!(ledger.call_count("getUserInfo"), 0);
    }

    #[tokio::test]
    async fn test_cleared_exists_flag_wins_over_fields() {
        let mut record = OrganizationRecord::new("0xABC", 50);
        record.exists = false;
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_organization(org1(), record)
                .with_user("0xABC", UserInfo::admin()),
        );
        let resolver = resolver_with(ledger.clone());

        let result = resolver
            .resolve(Some(&WalletAddress::new("0xABC")), &org1())
            .await;

        assert!(matches!(result, Err(ResolveError::OrganizationNotFound(_))));
        assert_eq!(ledger.call_count("getUserInfo"), 0);
    }

    #[tokio::test]
    async fn test_admin_address_differs_only_in_case() {
        let ledger = seeded("0xABC", "0xabc", true);
        let resolver = resolver_with(ledger.clone());

        let role = resolver
            .resolve(Some(&WalletAddress::new("0xabc")), &org1())
            .await
            .unwrap();

        assert_eq!(role, Role::OrganizationAdmin);
        assert_eq!(ledger.read_count(), 2);
    }

    #[tokio::test]
    async fn test_flag_without_address_match_is_voter() {
        let ledger = seeded("0xABC", "0xDEF", true);
        let resolver = resolver_with(ledger);

        let role = resolver
            .resolve(Some(&WalletAddress::new("0xDEF")), &org1())
            .await
            .unwrap();

        assert_eq!(role, Role::Voter);
    }

    #[tokio::test]
    async fn test_address_match_without_flag_is_voter() {
        let ledger = seeded("0xABC", "0xABC", false);
        let resolver = resolver_with(ledger);

        let role = resolver
            .resolve(Some(&WalletAddress::new("0xABC")), &org1())
            .await
            .unwrap();

        assert_eq!(role, Role::Voter);
    }

    #[tokio::test]
    async fn test_remote_failure_propagates() {
        let ledger = seeded("0xABC", "0xABC", true);
        ledger.fail_function("getUserInfo", "rpc down");
        let resolver = resolver_with(ledger);

        let result = resolver
            .resolve(Some(&WalletAddress::new("0xABC")), &org1())
            .await;

        assert!(matches!(result, Err(ResolveError::Remote(_))));
    }

    #[tokio::test]
    async fn test_unset_system_admin_reads_ledger() {
        let ledger = seeded("0xABC", "0xABC", true);
        let resolver = RoleResolver::new(ledger.clone(), AccessConfig::default());

        let role = resolver
            .resolve(Some(&WalletAddress::new(OWNER)), &org1())
            .await
            .unwrap();

        assert_eq!(role, Role::Voter);
        assert_eq!(ledger.read_count(), 2);
    }
}
