//! # VotreX Linkage
//!
//! Points the token contract at the system, staking and DEX contracts.
//!
//! A successful write is followed by an [`Invalidation`](votrex_types::Invalidation)
//! on the [`InvalidationBus`]. Gates and routers listening on the bus
//! re-resolve, because anything derived from ledger reads may depend on the
//! linkage that just changed.
//!
//! ## Key Components
//!
//! - [`ConfigMutator`]: one outstanding write per target kind, no retries
//! - [`InvalidationBus`]: broadcast of landed linkage writes
//! - [`LinkageConsole`]: the system-admin-only surface over the mutator

#![deny(unsafe_code)]

pub mod console;
pub mod error;
pub mod events;
pub mod mutator;
pub mod notice;

// Re-exports
pub use console::{ConsoleError, LinkageConsole};
pub use error::{MutationError, Result};
pub use events::InvalidationBus;
pub use mutator::{Ack, ConfigMutator};
pub use notice::LinkageNotice;
