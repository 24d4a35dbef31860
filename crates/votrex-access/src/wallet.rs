//! Connected wallet slot

use tokio::sync::watch;
use tracing::debug;
use votrex_types::WalletAddress;

/// Sender side of the connected-account channel.
///
/// Subscribers are only woken when the account actually changes; reconnecting
/// the same address in a different case is not a change.
pub struct WalletFeed {
    tx: watch::Sender<Option<WalletAddress>>,
}

impl WalletFeed {
    /// Start with no wallet connected.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Returns true when the connected account changed.
    pub fn connect(&self, address: WalletAddress) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if current.as_ref() == Some(&address) {
                return false;
            }
            *current = Some(address.clone());
            true
        });
        if changed {
            debug!(identity = address.normalized(), "Wallet connected");
        }
        changed
    }

    /// Returns true when a wallet was connected.
    pub fn disconnect(&self) -> bool {
        let changed = self.tx.send_if_modified(|current| current.take().is_some());
        if changed {
            debug!("Wallet disconnected");
        }
        changed
    }

    /// The connected wallet, if any.
    pub fn current(&self) -> Option<WalletAddress> {
        self.tx.borrow().clone()
    }

    /// Watch account changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<WalletAddress>> {
        self.tx.subscribe()
    }
}

impl Default for WalletFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_same_account_is_not_a_change() {
        let feed = WalletFeed::new();
        let rx = feed.subscribe();

        assert!(feed.connect(WalletAddress::new("0xabc")));
        assert!(!feed.connect(WalletAddress::new("0xABC")));
        assert!(rx.has_changed().unwrap());
        assert_eq!(feed.current(), Some(WalletAddress::new("0xabc")));
    }

    #[test]
    fn test_disconnect() {
        let feed = WalletFeed::new();
        assert!(!feed.disconnect());

        feed.connect(WalletAddress::new("0xabc"));
        assert!(feed.disconnect());
        assert_eq!(feed.current(), None);
    }
}
