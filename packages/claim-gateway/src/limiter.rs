//! Per-wallet claim attempt limiter (sliding window).

use alloy_primitives::Address;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptStatus {
    pub allowed: bool,
    pub remaining: usize,
    /// Milliseconds until the oldest attempt leaves the window.
    pub time_until_reset_ms: u64,
}

pub struct AttemptLimiter {
    limit: usize,
    window: Duration,
    attempts: Mutex<HashMap<Address, VecDeque<Instant>>>,
}

impl AttemptLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Address, VecDeque<Instant>>> {
        self.attempts.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self, wallet: &Address) -> AttemptStatus {
        self.status_at(wallet, Instant::now())
    }

    /// Record an attempt if the wallet is under the limit.
    pub fn record_attempt(&self, wallet: Address) -> Result<AttemptStatus, crate::Error> {
        self.record_attempt_at(wallet, Instant::now())
    }

    fn status_at(&self, wallet: &Address, now: Instant) -> AttemptStatus {
        let mut attempts = self.lock();
        match attempts.get_mut(wallet) {
            Some(window) => self.evaluate(window, now),
            None => self.evaluate(&mut VecDeque::new(), now),
        }
    }

    fn record_attempt_at(&self, wallet: Address, now: Instant) -> Result<AttemptStatus, crate::Error> {
        let mut attempts = self.lock();
        let window = attempts.entry(wallet).or_default();
        let status = self.evaluate(window, now);
        if !status.allowed {
            return Err(crate::Error::RateLimited {
                retry_after_secs: status.time_until_reset_ms.div_ceil(1000),
            });
        }
        window.push_back(now);
        Ok(AttemptStatus {
            remaining: status.remaining - 1,
            time_until_reset_ms: self.reset_in(window, now),
            ..status
        })
    }

    /// Forget wallets with no attempt inside the window.
    pub fn prune(&self) -> usize {
        let now = Instant::now();
        let mut attempts = self.lock();
        let before = attempts.len();
        attempts.retain(|_, window| {
            self.expire(window, now);
            !window.is_empty()
        });
        before - attempts.len()
    }

    pub fn tracked_wallets(&self) -> usize {
        self.lock().len()
    }

    fn expire(&self, window: &mut VecDeque<Instant>, now: Instant) {
        while window
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            window.pop_front();
        }
    }

    fn reset_in(&self, window: &VecDeque<Instant>, now: Instant) -> u64 {
        window
            .front()
            .map(|oldest| {
                (*oldest + self.window)
                    .saturating_duration_since(now)
                    .as_millis() as u64
            })
            .unwrap_or(0)
    }

    fn evaluate(&self, window: &mut VecDeque<Instant>, now: Instant) -> AttemptStatus {
        self.expire(window, now);
        AttemptStatus {
            allowed: window.len() < self.limit,
            remaining: self.limit.saturating_sub(window.len()),
            time_until_reset_ms: self.reset_in(window, now),
        }
    }
}
