//! Claim submission: validate, limit, submit, classify, resync.

use alloy_primitives::Address;
use drop_types::{validate_claim_params, ClaimFailure};
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::allowlist::SyncRegistry;
use crate::limiter::AttemptLimiter;
use crate::metrics::METRICS;
use crate::sdk::{ClaimSdk, TxHash};

/// Result of a submitted claim. Rejections before submission are `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ClaimOutcome {
    Submitted { tx_hash: TxHash },
    Failed(ClaimFailure),
}

impl ClaimOutcome {
    /// Whether eligibility should be re-read after this outcome.
    pub fn needs_resync(&self) -> bool {
        match self {
            Self::Submitted { .. } => true,
            Self::Failed(failure) => failure.should_update_allowed_state,
        }
    }
}

pub struct ClaimFlow<S> {
    registry: Arc<SyncRegistry<S>>,
    limiter: Arc<AttemptLimiter>,
    max_per_transaction: u64,
}

impl<S: ClaimSdk> ClaimFlow<S> {
    pub fn new(
        registry: Arc<SyncRegistry<S>>,
        limiter: Arc<AttemptLimiter>,
        max_per_transaction: u64,
    ) -> Self {
        Self {
            registry,
            limiter,
            max_per_transaction,
        }
    }

    /// Claim `quantity` for `wallet`. `recipient` defaults to the wallet and
    /// must equal it.
    pub async fn claim(
        &self,
        wallet: Address,
        recipient: Option<Address>,
        quantity: u64,
    ) -> Result<ClaimOutcome, crate::Error> {
        METRICS.claim_total.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let recipient = recipient.unwrap_or(wallet);
        if let Err(e) = validate_claim_params(quantity, recipient, wallet, self.max_per_transaction) {
            METRICS.claim_error.fetch_add(1, Ordering::Relaxed);
            return Err(e.into());
        }
        if let Err(e) = self.limiter.record_attempt(wallet) {
            METRICS.claim_rate_limited.fetch_add(1, Ordering::Relaxed);
            warn!(wallet = %wallet, "Claim attempt limit reached");
            return Err(e);
        }

        let resolver = self.registry.resolver();
        let outcome = match resolver
            .sdk()
            .claim(resolver.token_id(), quantity, recipient)
            .await
        {
            Ok(tx_hash) => {
                METRICS.claim_success.fetch_add(1, Ordering::Relaxed);
                info!(wallet = %wallet, quantity, tx_hash = %tx_hash, "Claim submitted");
                ClaimOutcome::Submitted { tx_hash }
            }
            Err(e) => {
                METRICS.claim_error.fetch_add(1, Ordering::Relaxed);
                let failure = ClaimFailure::from_message(&e.message());
                warn!(wallet = %wallet, kind = ?failure.kind, error = %e, "Claim failed");
                ClaimOutcome::Failed(failure)
            }
        };
        METRICS.record_claim_duration(started);

        if outcome.needs_resync() {
            let (sync, _) = self.registry.get_or_insert(wallet);
            sync.spawn_refetch();
        }
        Ok(outcome)
    }
}
