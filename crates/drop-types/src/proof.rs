//! Allowlist proofs and the eligibility entries derived from them.

use alloy_primitives::{Address, B256, U256, address};
use serde::{Deserialize, Serialize};

use crate::ClaimCondition;

/// USDC on Base. Last-resort currency when neither proof nor condition names one.
pub const USDC_BASE: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// Warning attached to entries granted without a proof.
pub const OPTIMISTIC_WARNING: &str = "Allowlist format issue detected - proceeding optimistically";

/// Proof returned by the off-chain proof service.
///
/// Hashes are opaque; only the bounds are inspected. Services disagree on
/// field names, so both spellings of each bound are accepted and the first
/// one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofData {
    #[serde(default)]
    pub proof: Vec<B256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_quantity_in_proof: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_claimable_per_wallet: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_token: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_address: Option<Address>,
}

impl ProofData {
    pub fn max_quantity(&self) -> Option<U256> {
        self.max_quantity_in_proof.or(self.max_claimable_per_wallet)
    }

    pub fn price(&self) -> Option<U256> {
        self.price_per_token.or(self.price)
    }

    pub fn currency(&self) -> Option<Address> {
        self.currency.or(self.currency_address)
    }
}

/// On-chain allowlist proof tuple passed to `verifyClaim` and `claim`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowlistProof {
    pub proof: Vec<B256>,
    pub max_quantity_in_proof: U256,
    pub price_per_token: U256,
    pub currency: Address,
}

impl AllowlistProof {
    /// Proof for a public phase: no hashes, contract defaults apply.
    pub fn public(condition: &ClaimCondition) -> Self {
        Self {
            proof: Vec::new(),
            max_quantity_in_proof: U256::ZERO,
            price_per_token: condition.price_per_token,
            currency: condition.currency,
        }
    }
}

/// Resolved eligibility record for one wallet against one condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistEntry {
    pub recipient: Address,
    pub max_claimable: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_token: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl AllowlistEntry {
    /// Entry granted without a proof when the proof service choked on the
    /// address format. The claim transaction decides the real eligibility.
    pub fn optimistic(recipient: Address) -> Self {
        Self {
            recipient,
            max_claimable: 1,
            price_per_token: None,
            currency: None,
            warning: Some(OPTIMISTIC_WARNING.to_string()),
        }
    }
}

/// Build the entry and the on-chain proof tuple for `recipient`.
///
/// Fallback order per bound: proof field, proof alias, condition, constant.
/// `max_claimable` treats a zero bound as absent; the on-chain tuple keeps a
/// zero bound, which the contract reads as "use the condition limit".
pub fn resolve_terms(
    recipient: Address,
    proof: &ProofData,
    condition: &ClaimCondition,
    fallback_currency: Address,
) -> (AllowlistEntry, AllowlistProof) {
    let max_claimable = [proof.max_quantity_in_proof, proof.max_claimable_per_wallet]
        .into_iter()
        .flatten()
        .find(|q| !q.is_zero())
        .map(|q| u64::try_from(q).unwrap_or(u64::MAX))
        .unwrap_or(1);

    let price_per_token = proof.price().unwrap_or(condition.price_per_token);
    let currency = proof
        .currency()
        .or_else(|| condition.currency())
        .unwrap_or(fallback_currency);

    let entry = AllowlistEntry {
        recipient,
        max_claimable,
        price_per_token: Some(price_per_token),
        currency: Some(currency),
        warning: None,
    };
    let onchain = AllowlistProof {
        proof: proof.proof.clone(),
        max_quantity_in_proof: proof.max_quantity().unwrap_or(U256::from(1)),
        price_per_token,
        currency,
    };
    (entry, onchain)
}
