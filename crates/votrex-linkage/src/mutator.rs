//! Linkage writes against the token contract

use crate::error::{MutationError, Result};
use crate::events::InvalidationBus;
use chrono::{DateTime, Utc};
use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use votrex_ledger::{LedgerGateway, LedgerMutation};
use votrex_types::{ConfigTarget, ConfigTargetKind, Invalidation, Receipt};

/// Acknowledgement of a landed linkage write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub target: ConfigTarget,
    pub receipt: Receipt,
    pub applied_at: DateTime<Utc>,
    pub invalidation: Invalidation,
}

/// Marks a target kind busy until dropped.
struct InFlightGuard<'a> {
    slots: &'a DashSet<ConfigTargetKind>,
    kind: ConfigTargetKind,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(slots: &'a DashSet<ConfigTargetKind>, kind: ConfigTargetKind) -> Option<Self> {
        slots.insert(kind).then(|| Self { slots, kind })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.slots.remove(&self.kind);
    }
}

/// Submits linkage writes, one outstanding write per target kind.
pub struct ConfigMutator {
    gateway: Arc<dyn LedgerGateway>,
    in_flight: DashSet<ConfigTargetKind>,
    bus: InvalidationBus,
}

impl ConfigMutator {
    /// Create a mutator writing through `gateway` and publishing on `bus`.
    pub fn new(gateway: Arc<dyn LedgerGateway>, bus: InvalidationBus) -> Self {
        Self {
            gateway,
            in_flight: DashSet::new(),
            bus,
        }
    }

    /// Bus that receives an invalidation for every landed write.
    pub fn bus(&self) -> &InvalidationBus {
        &self.bus
    }

    /// Whether a write for `kind` is outstanding.
    pub fn is_in_flight(&self, kind: ConfigTargetKind) -> bool {
        self.in_flight.contains(&kind)
    }

    /// Point `target`'s slot at its destination.
    ///
    /// Failures leave local state untouched and publish nothing. Nothing is
    /// retried.
    #[instrument(skip_all, fields(target = %target.kind(), destination = %target.destination()))]
    pub async fn apply(&self, target: ConfigTarget) -> Result<Ack> {
        let kind = target.kind();
        if target.destination().is_empty() {
            return Err(MutationError::InvalidDestination(kind));
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, kind)
            .ok_or(MutationError::InFlight(kind))?;

        let receipt = self
            .gateway
            .write(LedgerMutation::new(target.clone()))
            .await
            .map_err(|cause| {
                warn!(error = %cause, "Linkage write failed");
                MutationError::Remote { target: kind, cause }
            })?;

        let invalidation = Invalidation::new(kind, receipt.tx_hash.clone());
        let reached = self.bus.publish(invalidation.clone());
        info!(tx_hash = %receipt.tx_hash, subscribers = reached, "Linkage updated");

        Ok(Ack {
            target,
            receipt,
            applied_at: Utc::now(),
            invalidation,
        })
    }
}
