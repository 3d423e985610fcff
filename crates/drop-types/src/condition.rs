//! Claim condition snapshot as read from the drop contract.

use alloy_primitives::{Address, B256, U256, address};
use serde::Serialize;

/// Currency sentinel for the chain's native token.
pub const NATIVE_TOKEN: Address = address!("0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// One sale phase of a token. Read-only; re-fetched after every claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCondition {
    pub id: U256,
    pub start_timestamp: u64,
    pub max_claimable_supply: U256,
    pub supply_claimed: U256,
    pub quantity_limit_per_wallet: U256,
    /// `B256::ZERO` marks a public phase.
    pub merkle_root: B256,
    pub price_per_token: U256,
    pub currency: Address,
    pub metadata: String,
}

impl ClaimCondition {
    /// Public phases carry the all-zero root; no allowlist proof is needed.
    pub fn is_public(&self) -> bool {
        self.merkle_root.is_zero()
    }

    pub fn remaining_supply(&self) -> U256 {
        self.max_claimable_supply.saturating_sub(self.supply_claimed)
    }

    /// Condition currency, `None` when unset on-chain.
    pub fn currency(&self) -> Option<Address> {
        (!self.currency.is_zero()).then_some(self.currency)
    }

    pub fn is_native_currency(&self) -> bool {
        self.currency == NATIVE_TOKEN
    }
}

#[cfg(test)]
pub(crate) fn test_condition(merkle_root: B256) -> ClaimCondition {
    ClaimCondition {
        id: U256::from(2),
        start_timestamp: 1_735_689_600,
        max_claimable_supply: U256::from(500),
        supply_claimed: U256::from(120),
        quantity_limit_per_wallet: U256::from(5),
        merkle_root,
        price_per_token: U256::from(25_000_000u64),
        currency: address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        metadata: String::new(),
    }
}
