//! Organization admin dashboard

use crate::gate::{AccessGate, DenialReason, GateVerdict, RequiredRoles};
use crate::resolver::RoleResolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;
use votrex_ledger::{LedgerGateway, RemoteError};
use votrex_types::{OrgId, WalletAddress};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Access denied: {0}")]
    Denied(DenialReason),

    #[error("Superseded by a newer identity")]
    Superseded,

    #[error("Organization {0} does not exist")]
    OrganizationNotFound(OrgId),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub org_id: OrgId,
    pub admin: WalletAddress,
    pub member_count: u64,
}

/// Member count view, open to organization admins.
pub struct OrganizationDashboard {
    gate: AccessGate,
    ledger: Arc<dyn LedgerGateway>,
}

impl OrganizationDashboard {
    /// Create a dashboard gated to organization admins and the system admin.
    pub fn new(resolver: Arc<RoleResolver>, org_id: OrgId) -> Self {
        let ledger = resolver.ledger().clone();
        Self {
            gate: AccessGate::new(resolver, org_id, RequiredRoles::organization_admin()),
            ledger,
        }
    }

    /// Summarize the organization for `identity`.
    ///
    /// The system admin passes the gate without an organization read, so the
    /// record's exists flag is checked here as well.
    #[instrument(skip_all, fields(org_id = %self.gate.org_id()))]
    pub async fn summary(
        &self,
        identity: Option<WalletAddress>,
    ) -> Result<OrganizationSummary, DashboardError> {
        match self.gate.refresh(identity).await {
            GateVerdict::Allowed(_) => {}
            GateVerdict::Denied(reason) => return Err(DashboardError::Denied(reason)),
            GateVerdict::Pending => return Err(DashboardError::Superseded),
        }

        let org_id = self.gate.org_id();
        let record = self.ledger.organization_data(org_id).await?;
        if !record.exists {
            return Err(DashboardError::OrganizationNotFound(org_id.clone()));
        }

        Ok(OrganizationSummary {
            org_id: org_id.clone(),
            admin: record.admin,
            member_count: record.member_count,
        })
    }
}
