//! In-memory contract double
//!
//! Behaves like the deployed contracts for the calls this workspace makes:
//! unknown organizations read back as the all-default record, unknown callers
//! as an empty user info, and linkage writes overwrite the slot. Every call is
//! counted so tests can assert on ledger traffic.

use crate::error::{FixtureError, RemoteError, Result};
use crate::gateway::{LedgerGateway, LedgerMutation, LedgerQuery, LedgerValue};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use votrex_types::{
    ConfigTargetKind, OrgId, OrganizationRecord, Receipt, UserInfo, WalletAddress,
};

/// Seed data for [`InMemoryLedger`], usually loaded from JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LedgerFixture {
    #[serde(default)]
    pub organizations: BTreeMap<String, OrganizationRecord>,
    #[serde(default)]
    pub users: BTreeMap<String, UserInfo>,
    #[serde(default)]
    pub linkage: BTreeMap<ConfigTargetKind, WalletAddress>,
}

/// In-memory ledger
pub struct InMemoryLedger {
    organizations: DashMap<OrgId, OrganizationRecord>,
    users: DashMap<WalletAddress, UserInfo>,
    linkage: DashMap<ConfigTargetKind, WalletAddress>,
    calls: DashMap<&'static str, u64>,
    failures: DashMap<&'static str, String>,
    tx_counter: AtomicU64,
}

impl InMemoryLedger {
    /// Empty ledger; every organization reads as missing.
    pub fn new() -> Self {
        Self {
            organizations: DashMap::new(),
            users: DashMap::new(),
            linkage: DashMap::new(),
            calls: DashMap::new(),
            failures: DashMap::new(),
            tx_counter: AtomicU64::new(0),
        }
    }

    /// Seed the ledger from `fixture`.
    pub fn from_fixture(fixture: LedgerFixture) -> std::result::Result<Self, FixtureError> {
        let ledger = Self::new();
        for (org_id, record) in fixture.organizations {
            ledger.organizations.insert(OrgId::new(org_id)?, record);
        }
        for (caller, info) in fixture.users {
            ledger.users.insert(WalletAddress::parse(&caller)?, info);
        }
        for (kind, destination) in fixture.linkage {
            ledger.linkage.insert(kind, destination);
        }
        Ok(ledger)
    }

    /// Load a JSON fixture from `path`.
    pub fn from_fixture_file(path: impl AsRef<Path>) -> std::result::Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path)?;
        let fixture: LedgerFixture = serde_json::from_str(&raw)?;
        Self::from_fixture(fixture)
    }

    /// Add or replace an organization record.
    pub fn with_organization(self, org_id: OrgId, record: OrganizationRecord) -> Self {
        self.organizations.insert(org_id, record);
        self
    }

    /// Add or replace the user info returned to `caller`.
    pub fn with_user(self, caller: impl Into<WalletAddress>, info: UserInfo) -> Self {
        self.users.insert(caller.into(), info);
        self
    }

    /// Current destination of a linkage slot.
    pub fn linkage(&self, kind: ConfigTargetKind) -> Option<WalletAddress> {
        self.linkage.get(&kind).map(|d| d.clone())
    }

    /// Make every call to `function` fail with a contract rejection.
    pub fn fail_function(&self, function: &'static str, reason: impl Into<String>) {
        self.failures.insert(function, reason.into());
    }

    /// Drop every injected failure.
    pub fn clear_failures(&self) {
        self.failures.clear();
    }

    /// Number of calls made to `function`, failed ones included.
    pub fn call_count(&self, function: &str) -> u64 {
        self.calls.get(function).map(|c| *c).unwrap_or(0)
    }

    /// Total number of reads of any kind.
    pub fn read_count(&self) -> u64 {
        self.call_count(crate::gateway::ORGANIZATION_DATA)
            + self.call_count(crate::gateway::GET_USER_INFO)
    }

    fn record_call(&self, function: &'static str) -> Result<()> {
        *self.calls.entry(function).or_insert(0) += 1;
        match self.failures.get(function) {
            Some(reason) => Err(RemoteError::Rejected {
                function: function.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn read(&self, query: LedgerQuery) -> Result<LedgerValue> {
        self.record_call(query.function_name())?;
        debug!(function = query.function_name(), "In-memory ledger read");

        Ok(match query {
            LedgerQuery::OrganizationData { org_id } => LedgerValue::Organization(
                self.organizations
                    .get(&org_id)
                    .map(|r| r.clone())
                    .unwrap_or_else(OrganizationRecord::missing),
            ),
            LedgerQuery::UserInfo { caller } => LedgerValue::User(
                self.users
                    .get(&caller)
                    .map(|u| u.clone())
                    .unwrap_or_default(),
            ),
        })
    }

    async fn write(&self, mutation: LedgerMutation) -> Result<Receipt> {
        let function = mutation.function_name();
        self.record_call(function)?;

        let kind = mutation.target.kind();
        self.linkage
            .insert(kind, mutation.target.destination().clone());

        let sequence = self.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(function, sequence, "In-memory ledger write");

        Ok(Receipt {
            tx_hash: format!("0x{:064x}", sequence),
            function: function.to_string(),
        })
    }
}
