//! # VotreX Access
//!
//! Decides who a connected wallet is within an organization and what it may
//! see.
//!
//! ## Key Components
//!
//! - [`RoleResolver`]: identity + organization id → [`Role`](votrex_types::Role)
//! - [`AccessGate`]: holds a protected view back until resolution settles
//! - [`SessionRouter`]: sends a logging-in wallet to the admin or voter surface
//! - [`OrganizationDashboard`]: member count for organization admins
//! - [`SessionTracker`]: per-view session state that drops stale resolutions
//! - [`WalletFeed`]: observable connected-account slot
//!
//! ## Failure policy
//!
//! Resolution failures are never turned into a role. The gate treats every
//! failure as a denial and the router keeps the caller on the login page.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use votrex_access::{AccessConfig, AccessGate, RequiredRoles, RoleResolver};
//! use votrex_ledger::InMemoryLedger;
//! use votrex_types::{OrgId, WalletAddress};
//!
//! # async fn example() {
//! let config = AccessConfig::default().with_system_admin(WalletAddress::new("0xOWNER"));
//! let resolver = Arc::new(RoleResolver::new(Arc::new(InMemoryLedger::new()), config));
//! let gate = AccessGate::new(
//!     resolver,
//!     OrgId::new("ORG1").unwrap(),
//!     RequiredRoles::organization_admin(),
//! );
//!
//! let verdict = gate.refresh(Some(WalletAddress::new("0xabc"))).await;
//! println!("{verdict:?}");
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod resolver;
pub mod router;
pub mod session;
pub mod wallet;

// Re-exports
pub use config::AccessConfig;
pub use dashboard::{DashboardError, OrganizationDashboard, OrganizationSummary};
pub use error::ResolveError;
pub use gate::{AccessGate, DenialReason, GateVerdict, Guarded, RequiredRoles};
pub use resolver::RoleResolver;
pub use router::{Destination, LoginOutcome, SessionRouter};
pub use session::{ResolutionStatus, SessionFailure, SessionState, SessionTracker, Ticket};
pub use wallet::WalletFeed;
