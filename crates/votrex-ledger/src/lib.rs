//! VotreX Ledger - typed gateway over the VotreX contracts
//!
//! This crate is the only place that talks to the remote contract:
//!
//! - **LedgerGateway**: async read/write trait every other layer depends on
//! - **codec**: decodes the contract's positional tuples into named records
//! - **InMemoryLedger**: contract double for development and tests
//! - **HttpLedgerGateway**: JSON bridge to a ledger relay
//!
//! The gateway never retries. Callers own retry policy, and a write is only
//! observable through a fresh read.

#![deny(unsafe_code)]

pub mod codec;
pub mod error;
pub mod gateway;
pub mod http;
pub mod memory;

// Re-exports
pub use error::{FixtureError, RemoteError, Result};
pub use gateway::{LedgerGateway, LedgerMutation, LedgerQuery, LedgerValue};
pub use http::HttpLedgerGateway;
pub use memory::{InMemoryLedger, LedgerFixture};
