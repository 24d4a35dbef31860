//! Error types for linkage mutations

use thiserror::Error;
use votrex_ledger::RemoteError;
use votrex_types::ConfigTargetKind;

#[derive(Debug, Error)]
pub enum MutationError {
    /// The ledger refused or never answered; nothing changed locally.
    #[error("Setting {target} failed: {cause}")]
    Remote {
        target: ConfigTargetKind,
        #[source]
        cause: RemoteError,
    },

    /// A write for this target kind is still outstanding.
    #[error("A {0} update is already in flight")]
    InFlight(ConfigTargetKind),

    #[error("Empty destination address for {0}")]
    InvalidDestination(ConfigTargetKind),
}

impl MutationError {
    /// Slot the failed mutation targeted.
    pub fn target(&self) -> ConfigTargetKind {
        match self {
            MutationError::Remote { target, .. } => *target,
            MutationError::InFlight(kind) | MutationError::InvalidDestination(kind) => *kind,
        }
    }
}

pub type Result<T> = std::result::Result<T, MutationError>;
