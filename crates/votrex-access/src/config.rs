//! Access configuration

use serde::{Deserialize, Serialize};
use votrex_types::WalletAddress;

/// Settings injected into [`RoleResolver`](crate::RoleResolver) at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Owner of the whole system. Unset means nobody resolves as system admin.
    #[serde(default)]
    pub system_admin: Option<WalletAddress>,
}

impl AccessConfig {
    /// Set the address that resolves to [`Role::SystemAdmin`](votrex_types::Role::SystemAdmin).
    pub fn with_system_admin(mut self, address: WalletAddress) -> Self {
        self.system_admin = Some(address);
        self
    }

    /// Case-insensitive match against the configured system admin.
    pub fn is_system_admin(&self, identity: &WalletAddress) -> bool {
        match &self.system_admin {
            Some(admin) => !admin.is_empty() && admin == identity,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_admin_matches_nobody() {
        let config = AccessConfig::default();
        assert!(!config.is_system_admin(&WalletAddress::new("0xabc")));
        assert!(!config.is_system_admin(&WalletAddress::new("")));
    }

    #[test]
    fn test_blank_admin_matches_nobody() {
        let config = AccessConfig::default().with_system_admin(WalletAddress::new("  "));
        assert!(!config.is_system_admin(&WalletAddress::new("")));
    }

    #[test]
    fn test_admin_match_ignores_case() {
        let config = AccessConfig::default().with_system_admin(WalletAddress::new("0xOwNeR"));
        assert!(config.is_system_admin(&WalletAddress::new("0XOWNER")));
    }
}
