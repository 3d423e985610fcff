//! Allowlist eligibility resolution.
//!
//! [`AllowlistResolver`] turns (wallet, token) into one [`ResolutionState`] by
//! walking an ordered fallback chain over the [`ClaimSdk`]. Every failure is
//! folded into the state here; nothing propagates to callers as an error.
//!
//! [`AllowlistSync`] owns the published snapshot for one wallet and
//! [`SyncRegistry`] keeps one sync per wallet.

mod registry;
mod sync;

pub use registry::SyncRegistry;
pub use sync::{AllowlistSync, Snapshot};

use alloy_primitives::{Address, U256};
use drop_types::{resolve_terms, AllowlistEntry, ClaimCondition, ProofData};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::metrics::METRICS;
use crate::sdk::{ClaimSdk, ProofError, VerifyClaim};

/// How a settled resolution reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Zero merkle root: anyone may claim.
    Public,
    ProofConfirmed,
    ProofRejected,
    ProofNotFound,
    /// Proof service choked on the address; allowed optimistically.
    ProofServiceMalformed,
    ProofServiceOther,
    /// Proof held but `verifyClaim` could not be evaluated; allowed optimistically.
    VerificationUnavailable,
}

impl Eligibility {
    pub fn is_allowed(self) -> bool {
        matches!(
            self,
            Self::Public
                | Self::ProofConfirmed
                | Self::ProofServiceMalformed
                | Self::VerificationUnavailable
        )
    }
}

/// Resolution failures that end in an error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No claim phase is active for the token. Not retried automatically.
    NoActivePhase,
    /// Reading the claim condition failed.
    SyncFailed(String),
}

impl ResolveError {
    /// Only transport-level sync failures get a retry affordance.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::SyncFailed(_))
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActivePhase => write!(f, "No active claim phase"),
            Self::SyncFailed(msg) => write!(f, "Failed to check allowlist status: {msg}"),
        }
    }
}

/// Resolver output for one (wallet, token). Replaced wholesale on every sync.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolutionState {
    /// No wallet connected.
    #[default]
    Idle,
    Loading,
    Resolved {
        eligibility: Eligibility,
        entry: Option<AllowlistEntry>,
        proof: Option<ProofData>,
        condition: Option<ClaimCondition>,
    },
    Failed(ResolveError),
}

impl ResolutionState {
    fn resolved(eligibility: Eligibility, condition: ClaimCondition) -> Self {
        Self::Resolved {
            eligibility,
            entry: None,
            proof: None,
            condition: Some(condition),
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    pub fn entry(&self) -> Option<&AllowlistEntry> {
        match self {
            Self::Resolved { entry, .. } => entry.as_ref(),
            _ => None,
        }
    }

    pub fn view(&self) -> EligibilityView {
        match self {
            Self::Idle => EligibilityView::default(),
            Self::Loading => EligibilityView {
                is_loading: true,
                ..EligibilityView::default()
            },
            Self::Resolved {
                eligibility, entry, ..
            } => EligibilityView {
                is_allowed: Some(eligibility.is_allowed()),
                allowlist_entry: entry.clone(),
                reason: Some(*eligibility),
                ..EligibilityView::default()
            },
            Self::Failed(err) => EligibilityView {
                is_allowed: Some(false),
                error: Some(err.to_string()),
                retryable: err.retryable(),
                ..EligibilityView::default()
            },
        }
    }
}

/// What the UI renders: `isAllowed` is `null` only while idle or loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityView {
    pub is_loading: bool,
    pub is_allowed: Option<bool>,
    pub allowlist_entry: Option<AllowlistEntry>,
    pub error: Option<String>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Eligibility>,
}

/// Computes eligibility for a token on the drop contract.
pub struct AllowlistResolver<S> {
    sdk: Arc<S>,
    token_id: U256,
    fallback_currency: Address,
}

impl<S: ClaimSdk> AllowlistResolver<S> {
    pub fn new(sdk: Arc<S>, token_id: U256, fallback_currency: Address) -> Self {
        Self {
            sdk,
            token_id,
            fallback_currency,
        }
    }

    pub fn sdk(&self) -> &Arc<S> {
        &self.sdk
    }

    pub fn token_id(&self) -> U256 {
        self.token_id
    }

    /// Run the fallback chain for `wallet`. Always settles; never `Loading`.
    pub async fn resolve(&self, wallet: Option<Address>) -> ResolutionState {
        let Some(wallet) = wallet else {
            return ResolutionState::Idle;
        };

        let state = self.resolve_wallet(wallet).await;
        match &state {
            ResolutionState::Resolved { eligibility, .. } => {
                METRICS.record_eligibility(*eligibility);
                info!(wallet = %wallet, eligibility = ?eligibility, "Eligibility resolved");
            }
            ResolutionState::Failed(err) => {
                METRICS.sync_failed.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                warn!(wallet = %wallet, error = %err, "Eligibility sync failed");
            }
            ResolutionState::Idle | ResolutionState::Loading => {}
        }
        state
    }

    async fn resolve_wallet(&self, wallet: Address) -> ResolutionState {
        let condition = match self.sdk.active_claim_condition(self.token_id).await {
            Ok(Some(condition)) => condition,
            Ok(None) => return ResolutionState::Failed(ResolveError::NoActivePhase),
            Err(e) => return ResolutionState::Failed(ResolveError::SyncFailed(e.to_string())),
        };

        if condition.is_public() {
            return ResolutionState::resolved(Eligibility::Public, condition);
        }

        let proof = match self.sdk.fetch_proof(wallet, condition.merkle_root).await {
            Ok(Some(proof)) => proof,
            Ok(None) => return ResolutionState::resolved(Eligibility::ProofNotFound, condition),
            Err(ProofError::MalformedAddress(msg)) => {
                warn!(wallet = %wallet, error = %msg, "Proof service rejected address format, allowing optimistically");
                return ResolutionState::Resolved {
                    eligibility: Eligibility::ProofServiceMalformed,
                    entry: Some(AllowlistEntry::optimistic(wallet)),
                    proof: None,
                    condition: Some(condition),
                };
            }
            Err(ProofError::Service(msg)) => {
                warn!(wallet = %wallet, error = %msg, "Proof service error");
                return ResolutionState::resolved(Eligibility::ProofServiceOther, condition);
            }
        };

        let (entry, onchain) = resolve_terms(wallet, &proof, &condition, self.fallback_currency);
        let request = VerifyClaim {
            condition_id: condition.id,
            claimer: wallet,
            token_id: self.token_id,
            quantity: U256::from(1),
            currency: onchain.currency,
            price_per_token: onchain.price_per_token,
            allowlist_proof: onchain,
        };

        let eligibility = match self.sdk.verify_claim(request).await {
            Ok(true) => Eligibility::ProofConfirmed,
            Ok(false) => Eligibility::ProofRejected,
            Err(e) => {
                debug!(wallet = %wallet, error = %e, "verifyClaim unavailable, trusting proof");
                Eligibility::VerificationUnavailable
            }
        };

        ResolutionState::Resolved {
            eligibility,
            entry: Some(entry),
            proof: Some(proof),
            condition: Some(condition),
        }
    }
}
