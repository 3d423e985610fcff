//! Response types for the gateway API.

use alloy_primitives::{Address, U256};
use drop_types::{ClaimCondition, ClaimFailure};
use serde::Serialize;

use crate::allowlist::EligibilityView;
use crate::claim::ClaimOutcome;
use crate::sdk::TxHash;

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chain_id: u64,
    pub contract: String,
    pub active_rpc: String,
    pub failovers: u64,
    pub tracked_wallets: usize,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
}

/// Eligibility for one wallet.
#[derive(Serialize)]
pub struct EligibilityResponse {
    pub wallet: Address,
    pub generation: u64,
    #[serde(flatten)]
    pub view: EligibilityView,
}

/// Active claim phase summary.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResponse {
    pub condition_id: U256,
    pub start_timestamp: u64,
    pub price_per_token: U256,
    pub currency: Address,
    pub native_currency: bool,
    pub max_claimable_supply: U256,
    pub supply_claimed: U256,
    pub remaining_supply: U256,
    pub quantity_limit_per_wallet: U256,
    pub is_public: bool,
}

impl PhaseResponse {
    pub fn new(condition: &ClaimCondition, fallback_currency: Address) -> Self {
        Self {
            condition_id: condition.id,
            start_timestamp: condition.start_timestamp,
            price_per_token: condition.price_per_token,
            currency: condition.currency().unwrap_or(fallback_currency),
            native_currency: condition.is_native_currency(),
            max_claimable_supply: condition.max_claimable_supply,
            supply_claimed: condition.supply_claimed,
            remaining_supply: condition.remaining_supply(),
            quantity_limit_per_wallet: condition.quantity_limit_per_wallet,
            is_public: condition.is_public(),
        }
    }
}

/// Response from the claim endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ClaimFailure>,
}

impl From<ClaimOutcome> for ClaimResponse {
    fn from(outcome: ClaimOutcome) -> Self {
        match outcome {
            ClaimOutcome::Submitted { tx_hash } => Self {
                success: true,
                tx_hash: Some(tx_hash),
                error: None,
            },
            ClaimOutcome::Failed(failure) => Self {
                success: false,
                tx_hash: None,
                error: Some(failure),
            },
        }
    }
}
