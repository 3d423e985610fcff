//! Gateway configuration.

use alloy_primitives::{Address, U256};
use drop_types::{parse_address, validate_chain};
use serde::Deserialize;
use std::time::Duration;

/// Configuration for the claim gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::rpc_url")]
    pub rpc_url: String,

    #[serde(default = "defaults::fallback_rpc_url")]
    pub fallback_rpc_url: String,

    /// Node holding the claimer's unlocked account; claims are sent here.
    #[serde(default = "defaults::wallet_rpc_url")]
    pub wallet_rpc_url: String,

    #[serde(default = "defaults::chain_id")]
    pub chain_id: u64,

    #[serde(default = "defaults::contract_address")]
    pub contract_address: String,

    /// When set, `contract_address` must match it.
    #[serde(default)]
    pub verified_contract: Option<String>,

    #[serde(default)]
    pub token_id: u64,

    #[serde(default = "defaults::proof_service_url")]
    pub proof_service_url: String,

    /// Used when neither the proof nor the condition names a currency.
    #[serde(default = "defaults::fallback_currency")]
    pub fallback_currency: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    #[serde(default = "defaults::max_per_transaction")]
    pub max_per_transaction: u64,

    #[serde(default = "defaults::claim_attempt_limit")]
    pub claim_attempt_limit: usize,

    #[serde(default = "defaults::claim_attempt_window_secs")]
    pub claim_attempt_window_secs: u64,

    /// Syncs untouched for longer than this are evicted by the sweeper.
    #[serde(default = "defaults::sync_idle_secs")]
    pub sync_idle_secs: u64,

    #[serde(default = "defaults::sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upper bound on wallets with a live sync. The most idle is evicted
    /// to make room.
    #[serde(default = "defaults::max_tracked_wallets")]
    pub max_tracked_wallets: usize,

    #[serde(default = "defaults::rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: defaults::rpc_url(),
            fallback_rpc_url: defaults::fallback_rpc_url(),
            wallet_rpc_url: defaults::wallet_rpc_url(),
            chain_id: defaults::chain_id(),
            contract_address: defaults::contract_address(),
            verified_contract: None,
            token_id: 0,
            proof_service_url: defaults::proof_service_url(),
            fallback_currency: defaults::fallback_currency(),
            bind_address: defaults::bind_address(),
            max_per_transaction: defaults::max_per_transaction(),
            claim_attempt_limit: defaults::claim_attempt_limit(),
            claim_attempt_window_secs: defaults::claim_attempt_window_secs(),
            sync_idle_secs: defaults::sync_idle_secs(),
            sweep_interval_secs: defaults::sweep_interval_secs(),
            max_tracked_wallets: defaults::max_tracked_wallets(),
            rpc_timeout_secs: defaults::rpc_timeout_secs(),
        }
    }
}

impl Config {
    /// Deployment sanity checks. Collects every problem before failing.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut errors = Vec::new();

        if let Err(e) = validate_chain(self.chain_id) {
            errors.push(e.to_string());
        }
        match parse_address(&self.contract_address) {
            Ok(contract) => {
                if let Some(verified) = &self.verified_contract {
                    match parse_address(verified) {
                        Ok(v) if v == contract => {}
                        Ok(_) => errors.push(format!(
                            "contract {} does not match verified contract {verified}",
                            self.contract_address
                        )),
                        Err(e) => errors.push(format!("verified_contract: {e}")),
                    }
                }
            }
            Err(e) => errors.push(format!("contract_address: {e}")),
        }
        if let Err(e) = parse_address(&self.fallback_currency) {
            errors.push(format!("fallback_currency: {e}"));
        }
        if self.proof_service_url.trim().is_empty() {
            errors.push("proof_service_url is required".into());
        }
        if self.max_per_transaction == 0 {
            errors.push("max_per_transaction must be at least 1".into());
        }
        if self.max_tracked_wallets == 0 {
            errors.push("max_tracked_wallets must be at least 1".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::Config(errors.join("; ")))
        }
    }

    pub fn contract(&self) -> Result<Address, crate::Error> {
        parse_address(&self.contract_address)
            .map_err(|e| crate::Error::Config(format!("contract_address: {e}")))
    }

    pub fn fallback_currency(&self) -> Result<Address, crate::Error> {
        parse_address(&self.fallback_currency)
            .map_err(|e| crate::Error::Config(format!("fallback_currency: {e}")))
    }

    pub fn token(&self) -> U256 {
        U256::from(self.token_id)
    }

    pub fn claim_attempt_window(&self) -> Duration {
        Duration::from_secs(self.claim_attempt_window_secs)
    }

    pub fn sync_idle(&self) -> Duration {
        Duration::from_secs(self.sync_idle_secs)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

mod defaults {
    fn network() -> String {
        std::env::var("CLAIM_GATEWAY_NETWORK").unwrap_or_else(|_| "mainnet".into())
    }

    pub fn rpc_url() -> String {
        if network().contains("sepolia") {
            "https://sepolia.base.org".into()
        } else {
            "https://mainnet.base.org".into()
        }
    }

    pub fn fallback_rpc_url() -> String {
        if network().contains("sepolia") {
            "https://base-sepolia-rpc.publicnode.com".into()
        } else {
            "https://base-rpc.publicnode.com".into()
        }
    }

    pub fn wallet_rpc_url() -> String {
        "http://127.0.0.1:8545".into()
    }

    pub fn chain_id() -> u64 {
        if network().contains("sepolia") {
            84532
        } else {
            8453
        }
    }

    pub fn contract_address() -> String {
        "0xFe97bF3E1d8F3A414cbcda78Ab74283C357B9f07".into()
    }

    pub fn proof_service_url() -> String {
        "http://127.0.0.1:3051".into()
    }

    pub fn fallback_currency() -> String {
        "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913".into()
    }

    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn max_per_transaction() -> u64 {
        drop_types::MAX_PER_TRANSACTION
    }

    pub fn claim_attempt_limit() -> usize {
        6
    }

    pub fn claim_attempt_window_secs() -> u64 {
        60
    }

    pub fn sync_idle_secs() -> u64 {
        900
    }

    pub fn sweep_interval_secs() -> u64 {
        60
    }

    pub fn max_tracked_wallets() -> usize {
        10_000
    }

    pub fn rpc_timeout_secs() -> u64 {
        15
    }
}
