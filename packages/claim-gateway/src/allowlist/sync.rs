//! Published eligibility state for one wallet.

use alloy_primitives::Address;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::debug;

use super::{AllowlistResolver, EligibilityView, ResolutionState};
use crate::metrics::METRICS;
use crate::sdk::ClaimSdk;

/// Value carried by the watch channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Bumped each time a sync starts.
    pub generation: u64,
    pub wallet: Option<Address>,
    pub state: ResolutionState,
}

/// Owns the single [`ResolutionState`] for a wallet and publishes it.
///
/// A sync bumps the generation and publishes `Loading` in one write; its
/// result is published only if no newer sync started in the meantime.
pub struct AllowlistSync<S> {
    resolver: Arc<AllowlistResolver<S>>,
    tx: watch::Sender<Snapshot>,
    last_touched: Mutex<Instant>,
}

impl<S: ClaimSdk> AllowlistSync<S> {
    /// A sync for a connected wallet starts out `Loading` at generation 0,
    /// so readers racing the first [`refetch`](Self::refetch) never see `Idle`.
    pub fn new(resolver: Arc<AllowlistResolver<S>>, wallet: Option<Address>) -> Self {
        let state = match wallet {
            Some(_) => ResolutionState::Loading,
            None => ResolutionState::Idle,
        };
        let (tx, _rx) = watch::channel(Snapshot {
            generation: 0,
            wallet,
            state,
        });
        Self {
            resolver,
            tx,
            last_touched: Mutex::new(Instant::now()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.touch();
        self.tx.borrow().clone()
    }

    pub fn view(&self) -> EligibilityView {
        self.touch();
        self.tx.borrow().state.view()
    }

    pub fn wallet(&self) -> Option<Address> {
        self.tx.borrow().wallet
    }

    /// Run one sync to completion, then return the latest settled snapshot.
    pub async fn refetch(&self) -> Snapshot {
        self.touch();
        METRICS.sync_total.fetch_add(1, Ordering::Relaxed);

        let mut generation = 0;
        let mut wallet = None;
        self.tx.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            wallet = s.wallet;
            s.state = ResolutionState::Loading;
        });

        let state = self.resolver.resolve(wallet).await;

        let published = self.tx.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            s.state = state;
            true
        });
        if !published {
            METRICS.sync_stale_discarded.fetch_add(1, Ordering::Relaxed);
            debug!(generation, "Discarded stale eligibility result");
        }

        self.settled().await
    }

    /// Start a sync without waiting for it.
    pub fn spawn_refetch(self: &Arc<Self>) {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            sync.refetch().await;
        });
    }

    /// Wait until no sync is in flight.
    pub async fn settled(&self) -> Snapshot {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let snapshot = match rx.wait_for(|s| s.state.is_settled()).await {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.tx.borrow().clone(),
        };
        snapshot
    }

    pub fn touch(&self) {
        *self.last_touched.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_touched
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }
}
