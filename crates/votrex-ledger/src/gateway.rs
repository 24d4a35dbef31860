//! The gateway trait and its call vocabulary

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use votrex_types::{ConfigTarget, OrgId, OrganizationRecord, Receipt, UserInfo, WalletAddress};

/// Contract function names consumed by this crate.
pub const ORGANIZATION_DATA: &str = "organizationData";
pub const GET_USER_INFO: &str = "getUserInfo";

/// A read against the system contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerQuery {
    OrganizationData { org_id: OrgId },
    /// Scoped to the calling identity, the way the contract scopes it to `msg.sender`.
    UserInfo { caller: WalletAddress },
}

impl LedgerQuery {
    pub fn function_name(&self) -> &'static str {
        match self {
            LedgerQuery::OrganizationData { .. } => ORGANIZATION_DATA,
            LedgerQuery::UserInfo { .. } => GET_USER_INFO,
        }
    }
}

/// Decoded result of a [`LedgerQuery`].
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerValue {
    Organization(OrganizationRecord),
    User(UserInfo),
}

impl LedgerValue {
    fn kind(&self) -> &'static str {
        match self {
            LedgerValue::Organization(_) => "organization",
            LedgerValue::User(_) => "user info",
        }
    }
}

/// A linkage write against the token contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerMutation {
    pub target: ConfigTarget,
}

impl LedgerMutation {
    /// Write `target`'s destination into its slot.
    pub fn new(target: ConfigTarget) -> Self {
        Self { target }
    }

    pub fn function_name(&self) -> &'static str {
        self.target.kind().function_name()
    }
}

/// Typed façade over the remote contract.
///
/// Implementations hold no session state and perform no retries; both calls
/// may suspend until the remote side answers.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Execute a read.
    async fn read(&self, query: LedgerQuery) -> Result<LedgerValue>;

    /// Submit a mutation and wait for its receipt.
    async fn write(&self, mutation: LedgerMutation) -> Result<Receipt>;

    /// Read and unwrap an organization record.
    async fn organization_data(&self, org_id: &OrgId) -> Result<OrganizationRecord> {
        match self
            .read(LedgerQuery::OrganizationData {
                org_id: org_id.clone(),
            })
            .await?
        {
            LedgerValue::Organization(record) => Ok(record),
            other => Err(RemoteError::UnexpectedValue {
                function: ORGANIZATION_DATA,
                found: other.kind(),
            }),
        }
    }

    /// Read and unwrap the user info of `caller`.
    async fn user_info(&self, caller: &WalletAddress) -> Result<UserInfo> {
        match self
            .read(LedgerQuery::UserInfo {
                caller: caller.clone(),
            })
            .await?
        {
            LedgerValue::User(info) => Ok(info),
            other => Err(RemoteError::UnexpectedValue {
                function: GET_USER_INFO,
                found: other.kind(),
            }),
        }
    }
}
