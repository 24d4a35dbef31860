//! VotreX Types - shared vocabulary for the access and linkage layers
//!
//! Everything here is plain data: wallet addresses, organization records as
//! decoded from the ledger, derived roles, linkage targets and the notices
//! handed to the toast collaborator.
#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Auto-close delay for every toast notice, in milliseconds.
pub const NOTICE_AUTO_CLOSE_MS: u64 = 3000;

/// A wallet (or contract) address.
///
/// Equality and hashing use the trimmed, lowercased form; the original
/// spelling is kept for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct WalletAddress {
    raw: String,
    normalized: String,
}

impl WalletAddress {
    /// Wrap `raw`, trimmed. Use [`WalletAddress::parse`] for user input.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into().trim().to_string();
        let normalized = raw.to_lowercase();
        Self { raw, normalized }
    }

    /// Parse user input, rejecting blank addresses.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        if raw.trim().is_empty() {
            return Err(TypeError::EmptyAddress);
        }
        Ok(Self::new(raw))
    }

    /// Lowercased form used for every comparison.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Address as it was supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the address is blank, meaning no wallet.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Case-insensitive comparison against a raw address string.
    pub fn matches(&self, other: &str) -> bool {
        self.normalized == other.trim().to_lowercase()
    }
}

impl PartialEq for WalletAddress {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for WalletAddress {}

impl Hash for WalletAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl From<String> for WalletAddress {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for WalletAddress {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<WalletAddress> for String {
    fn from(address: WalletAddress) -> Self {
        address.raw
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Organization identifier as typed into the login form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgId(String);

impl OrgId {
    /// Reject blank identifiers.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(TypeError::EmptyOrgId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrgId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrgId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Tuple positions the core does not interpret, keyed by position.
pub type OpaqueFields = BTreeMap<usize, serde_json::Value>;

/// Organization data as stored on the ledger.
///
/// A record whose `exists` flag is false describes nothing, whatever the
/// other fields hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub admin: WalletAddress,
    pub member_count: u64,
    pub exists: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: OpaqueFields,
}

impl OrganizationRecord {
    /// Record of an existing organization.
    pub fn new(admin: impl Into<WalletAddress>, member_count: u64) -> Self {
        Self {
            admin: admin.into(),
            member_count,
            exists: true,
            extra: OpaqueFields::new(),
        }
    }

    /// The all-default record the contract returns for an unknown id.
    pub fn missing() -> Self {
        Self {
            admin: WalletAddress::new(""),
            member_count: 0,
            exists: false,
            extra: OpaqueFields::new(),
        }
    }

    /// Whether `identity` is the stored admin. Always false for a missing record.
    pub fn is_administered_by(&self, identity: &WalletAddress) -> bool {
        self.exists && !self.admin.is_empty() && &self.admin == identity
    }
}

/// Per-caller user info as stored on the ledger.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: OpaqueFields,
}

impl UserInfo {
    /// User info carrying the admin flag.
    pub fn admin() -> Self {
        Self {
            is_admin: true,
            extra: OpaqueFields::new(),
        }
    }

    /// User info without the admin flag.
    pub fn member() -> Self {
        Self::default()
    }
}

/// Access level derived for a connected identity within one organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Unauthenticated,
    Voter,
    OrganizationAdmin,
    SystemAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unauthenticated => "unauthenticated",
            Role::Voter => "voter",
            Role::OrganizationAdmin => "organization_admin",
            Role::SystemAdmin => "system_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which linkage slot of the token contract a mutation changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigTargetKind {
    SystemContract,
    StakingContract,
    DexContract,
}

impl ConfigTargetKind {
    /// Contract function that writes this slot.
    pub fn function_name(&self) -> &'static str {
        match self {
            ConfigTargetKind::SystemContract => "setVotreXContract",
            ConfigTargetKind::StakingContract => "setStakingContract",
            ConfigTargetKind::DexContract => "setDexContract",
        }
    }

    /// Label shown to the operator.
    pub fn label(&self) -> &'static str {
        match self {
            ConfigTargetKind::SystemContract => "VotreX System Contract Address",
            ConfigTargetKind::StakingContract => "Staking Contract Address",
            ConfigTargetKind::DexContract => "DEx Contract Address",
        }
    }
}

impl std::fmt::Display for ConfigTargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.function_name())
    }
}

/// A linkage change together with its destination address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "destination", rename_all = "snake_case")]
pub enum ConfigTarget {
    SystemContract(WalletAddress),
    StakingContract(WalletAddress),
    DexContract(WalletAddress),
}

impl ConfigTarget {
    /// Point the `kind` slot at `destination`.
    pub fn new(kind: ConfigTargetKind, destination: impl Into<WalletAddress>) -> Self {
        let destination = destination.into();
        match kind {
            ConfigTargetKind::SystemContract => ConfigTarget::SystemContract(destination),
            ConfigTargetKind::StakingContract => ConfigTarget::StakingContract(destination),
            ConfigTargetKind::DexContract => ConfigTarget::DexContract(destination),
        }
    }

    pub fn kind(&self) -> ConfigTargetKind {
        match self {
            ConfigTarget::SystemContract(_) => ConfigTargetKind::SystemContract,
            ConfigTarget::StakingContract(_) => ConfigTargetKind::StakingContract,
            ConfigTarget::DexContract(_) => ConfigTargetKind::DexContract,
        }
    }

    pub fn destination(&self) -> &WalletAddress {
        match self {
            ConfigTarget::SystemContract(address)
            | ConfigTarget::StakingContract(address)
            | ConfigTarget::DexContract(address) => address,
        }
    }
}

impl std::fmt::Display for ConfigTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind(), self.destination())
    }
}

/// Receipt returned by a ledger write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub function: String,
}

/// Broadcast after a linkage write lands: every holder of derived state
/// must re-fetch, because reads may depend on the changed linkage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invalidation {
    pub id: uuid::Uuid,
    pub target: ConfigTargetKind,
    pub tx_hash: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

impl Invalidation {
    pub fn new(target: ConfigTargetKind, tx_hash: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            target,
            tx_hash: tx_hash.into(),
            at: chrono::Utc::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient user-visible message for the toast collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub auto_close_ms: u64,
}

impl Notice {
    /// Auto-closing success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            auto_close_ms: NOTICE_AUTO_CLOSE_MS,
        }
    }

    /// Auto-closing error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            auto_close_ms: NOTICE_AUTO_CLOSE_MS,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("Organization ID must not be empty")]
    EmptyOrgId,

    #[error("Address must not be empty")]
    EmptyAddress,

    #[error("Unknown linkage target: {0}")]
    UnknownTarget(String),
}

impl std::str::FromStr for ConfigTargetKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" | "votrex" | "system-contract" => Ok(ConfigTargetKind::SystemContract),
            "staking" | "staking-contract" => Ok(ConfigTargetKind::StakingContract),
            "dex" | "dex-contract" => Ok(ConfigTargetKind::DexContract),
            other => Err(TypeError::UnknownTarget(other.to_string())),
        }
    }
}
