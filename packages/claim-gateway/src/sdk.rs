//! Capability boundary to the chain and the proof service.
//!
//! Everything the gateway needs from the outside world goes through
//! [`ClaimSdk`]. Failures are typed here, once, so callers branch on variants
//! instead of matching message text.

use alloy_primitives::{Address, B256, U256};
use drop_types::{AllowlistProof, ClaimCondition, ProofData};
use std::fmt;
use std::future::Future;

/// Transaction hash returned by a successful claim submission.
pub type TxHash = B256;

/// Proof lookup failure, classified at the service boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The service could not handle the address format. Known service quirk,
    /// not an eligibility signal.
    MalformedAddress(String),
    /// Anything else: transport failure, 5xx, undecodable body.
    Service(String),
}

impl fmt::Display for ProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofError::MalformedAddress(msg) => write!(f, "malformed address: {msg}"),
            ProofError::Service(msg) => write!(f, "proof service: {msg}"),
        }
    }
}

impl std::error::Error for ProofError {}

impl From<ProofError> for crate::Error {
    fn from(e: ProofError) -> Self {
        crate::Error::ProofService(e.to_string())
    }
}

/// Arguments of the contract's read-only `verifyClaim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyClaim {
    pub condition_id: U256,
    pub claimer: Address,
    pub token_id: U256,
    pub quantity: U256,
    pub currency: Address,
    pub price_per_token: U256,
    pub allowlist_proof: AllowlistProof,
}

/// Upstream endpoint diagnostics reported by `/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointStatus {
    pub active_rpc: String,
    pub failovers: u64,
}

/// Drop contract and proof service, as seen by the resolver and claim flow.
pub trait ClaimSdk: Send + Sync + 'static {
    /// Active condition for `token_id`, `None` when no phase is active.
    fn active_claim_condition(
        &self,
        token_id: U256,
    ) -> impl Future<Output = Result<Option<ClaimCondition>, crate::Error>> + Send;

    /// Proof for `recipient` under `merkle_root`, `None` when not listed.
    fn fetch_proof(
        &self,
        recipient: Address,
        merkle_root: B256,
    ) -> impl Future<Output = Result<Option<ProofData>, ProofError>> + Send;

    fn verify_claim(
        &self,
        request: VerifyClaim,
    ) -> impl Future<Output = Result<bool, crate::Error>> + Send;

    /// Build, sign (wallet side) and broadcast a claim.
    fn claim(
        &self,
        token_id: U256,
        quantity: u64,
        recipient: Address,
    ) -> impl Future<Output = Result<TxHash, crate::Error>> + Send;

    fn endpoint_status(&self) -> EndpointStatus {
        EndpointStatus::default()
    }
}
