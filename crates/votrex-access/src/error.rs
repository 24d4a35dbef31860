//! Resolution errors

use thiserror::Error;
use votrex_ledger::RemoteError;
use votrex_types::OrgId;

/// Why a role could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The organization record came back with its existence flag cleared.
    #[error("Organization not found: {0}")]
    OrganizationNotFound(OrgId),

    #[error("Ledger error: {0}")]
    Remote(#[from] RemoteError),
}
