//! Prometheus metrics (lock-free atomics).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::allowlist::Eligibility;

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Eligibility syncs ---
    pub sync_total: AtomicU64,
    pub sync_public: AtomicU64,
    pub sync_proof_confirmed: AtomicU64,
    pub sync_proof_rejected: AtomicU64,
    pub sync_proof_not_found: AtomicU64,
    pub sync_proof_malformed: AtomicU64,
    pub sync_proof_service_error: AtomicU64,
    pub sync_verification_unavailable: AtomicU64,
    pub sync_failed: AtomicU64,
    pub sync_stale_discarded: AtomicU64,

    // --- Claims ---
    pub claim_total: AtomicU64,
    pub claim_success: AtomicU64,
    pub claim_error: AtomicU64,
    pub claim_rate_limited: AtomicU64,

    // --- Latency (μs, max updated via CAS) ---
    pub claim_duration_us_sum: AtomicU64,
    pub claim_duration_us_max: AtomicU64,

    // --- RPC ---
    pub rpc_failovers: AtomicU64,
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            sync_total: AtomicU64::new(0),
            sync_public: AtomicU64::new(0),
            sync_proof_confirmed: AtomicU64::new(0),
            sync_proof_rejected: AtomicU64::new(0),
            sync_proof_not_found: AtomicU64::new(0),
            sync_proof_malformed: AtomicU64::new(0),
            sync_proof_service_error: AtomicU64::new(0),
            sync_verification_unavailable: AtomicU64::new(0),
            sync_failed: AtomicU64::new(0),
            sync_stale_discarded: AtomicU64::new(0),
            claim_total: AtomicU64::new(0),
            claim_success: AtomicU64::new(0),
            claim_error: AtomicU64::new(0),
            claim_rate_limited: AtomicU64::new(0),
            claim_duration_us_sum: AtomicU64::new(0),
            claim_duration_us_max: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    pub fn record_eligibility(&self, eligibility: Eligibility) {
        let counter = match eligibility {
            Eligibility::Public => &self.sync_public,
            Eligibility::ProofConfirmed => &self.sync_proof_confirmed,
            Eligibility::ProofRejected => &self.sync_proof_rejected,
            Eligibility::ProofNotFound => &self.sync_proof_not_found,
            Eligibility::ProofServiceMalformed => &self.sync_proof_malformed,
            Eligibility::ProofServiceOther => &self.sync_proof_service_error,
            Eligibility::VerificationUnavailable => &self.sync_verification_unavailable,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_claim_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.claim_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        let mut cur = self.claim_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.claim_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, tracked_wallets: usize) -> String {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);

        let sync_total = load(&self.sync_total);
        let sync_failed = load(&self.sync_failed);
        let sync_stale = load(&self.sync_stale_discarded);
        let claim_total = load(&self.claim_total);
        let claim_success = load(&self.claim_success);
        let claim_error = load(&self.claim_error);
        let claim_rate_limited = load(&self.claim_rate_limited);
        let rpc_failovers = load(&self.rpc_failovers);
        let rpc_errors = load(&self.rpc_errors);

        let claim_dur_sum_s = load(&self.claim_duration_us_sum) as f64 / 1_000_000.0;
        let claim_dur_max_s =
            self.claim_duration_us_max.swap(0, Ordering::Relaxed) as f64 / 1_000_000.0;

        let outcomes = [
            ("public", load(&self.sync_public)),
            ("proof_confirmed", load(&self.sync_proof_confirmed)),
            ("proof_rejected", load(&self.sync_proof_rejected)),
            ("proof_not_found", load(&self.sync_proof_not_found)),
            ("proof_malformed", load(&self.sync_proof_malformed)),
            ("proof_service_error", load(&self.sync_proof_service_error)),
            ("verification_unavailable", load(&self.sync_verification_unavailable)),
        ];
        let outcome_lines: String = outcomes
            .iter()
            .map(|(label, n)| format!("claim_gateway_sync_outcome_total{{outcome=\"{label}\"}} {n}\n"))
            .collect();

        format!(
            "\
# HELP claim_gateway_sync_total Eligibility syncs started.\n\
# TYPE claim_gateway_sync_total counter\n\
claim_gateway_sync_total {sync_total}\n\
# HELP claim_gateway_sync_outcome_total Settled eligibility syncs by outcome.\n\
# TYPE claim_gateway_sync_outcome_total counter\n\
{outcome_lines}\
# HELP claim_gateway_sync_failed_total Syncs that ended in an error state.\n\
# TYPE claim_gateway_sync_failed_total counter\n\
claim_gateway_sync_failed_total {sync_failed}\n\
# HELP claim_gateway_sync_stale_total Sync results dropped because a newer sync started.\n\
# TYPE claim_gateway_sync_stale_total counter\n\
claim_gateway_sync_stale_total {sync_stale}\n\
# HELP claim_gateway_claim_total Claim requests received.\n\
# TYPE claim_gateway_claim_total counter\n\
claim_gateway_claim_total {claim_total}\n\
# HELP claim_gateway_claim_success_total Claims submitted.\n\
# TYPE claim_gateway_claim_success_total counter\n\
claim_gateway_claim_success_total {claim_success}\n\
# HELP claim_gateway_claim_error_total Claims rejected or failed.\n\
# TYPE claim_gateway_claim_error_total counter\n\
claim_gateway_claim_error_total {claim_error}\n\
# HELP claim_gateway_claim_rate_limited_total Claims refused by the attempt limiter.\n\
# TYPE claim_gateway_claim_rate_limited_total counter\n\
claim_gateway_claim_rate_limited_total {claim_rate_limited}\n\
# HELP claim_gateway_claim_duration_seconds_sum Total claim handling time (seconds).\n\
# TYPE claim_gateway_claim_duration_seconds_sum counter\n\
claim_gateway_claim_duration_seconds_sum {claim_dur_sum_s:.6}\n\
# HELP claim_gateway_claim_duration_seconds_max Max claim handling time since last scrape (seconds).\n\
# TYPE claim_gateway_claim_duration_seconds_max gauge\n\
claim_gateway_claim_duration_seconds_max {claim_dur_max_s:.6}\n\
# HELP claim_gateway_rpc_failovers_total RPC primary-to-fallback failovers.\n\
# TYPE claim_gateway_rpc_failovers_total counter\n\
claim_gateway_rpc_failovers_total {rpc_failovers}\n\
# HELP claim_gateway_rpc_errors_total RPC errors.\n\
# TYPE claim_gateway_rpc_errors_total counter\n\
claim_gateway_rpc_errors_total {rpc_errors}\n\
# HELP claim_gateway_tracked_wallets Wallets with a live eligibility sync.\n\
# TYPE claim_gateway_tracked_wallets gauge\n\
claim_gateway_tracked_wallets {tracked_wallets}\n"
        )
    }
}
