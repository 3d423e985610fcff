//! Application state shared across handlers.

use crate::allowlist::{AllowlistResolver, SyncRegistry};
use crate::claim::ClaimFlow;
use crate::config::Config;
use crate::limiter::AttemptLimiter;
use crate::sdk::ClaimSdk;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Shared application state.
pub struct AppState<S> {
    pub config: Config,
    pub sdk: Arc<S>,
    pub registry: Arc<SyncRegistry<S>>,
    pub limiter: Arc<AttemptLimiter>,
    pub claims: ClaimFlow<S>,
    pub start_time: Instant,
    ready: AtomicBool,
}

impl<S: ClaimSdk> AppState<S> {
    pub fn new(config: Config, sdk: Arc<S>) -> Result<Self, crate::Error> {
        let resolver = AllowlistResolver::new(
            Arc::clone(&sdk),
            config.token(),
            config.fallback_currency()?,
        );
        let registry = Arc::new(SyncRegistry::new(
            Arc::new(resolver),
            config.max_tracked_wallets,
        ));
        let limiter = Arc::new(AttemptLimiter::new(
            config.claim_attempt_limit,
            config.claim_attempt_window(),
        ));
        let claims = ClaimFlow::new(
            Arc::clone(&registry),
            Arc::clone(&limiter),
            config.max_per_transaction,
        );

        Ok(Self {
            config,
            sdk,
            registry,
            limiter,
            claims,
            start_time: Instant::now(),
            ready: AtomicBool::new(false),
        })
    }

    /// Set once the startup network check passed.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Evict idle syncs and expired limiter entries until cancelled.
    pub async fn run_sweeper(&self, cancel: CancellationToken) {
        let interval = Duration::from_secs(self.config.sweep_interval_secs.max(1));
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {},
                _ = cancel.cancelled() => {
                    info!("Sweeper shutting down");
                    return;
                }
            }
            self.sweep();
        }
    }

    pub fn sweep(&self) {
        let evicted = self.registry.sweep_idle(self.config.sync_idle());
        let pruned = self.limiter.prune();
        if evicted > 0 || pruned > 0 {
            info!(evicted, pruned, "Sweep complete");
        }
    }
}
