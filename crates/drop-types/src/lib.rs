//! Shared types and pure-logic utilities for drop claims.
//! No RPC or HTTP dependency; usable by any client of the drop contract.

mod claim_error;
mod condition;
mod error;
mod proof;
mod validation;

pub use claim_error::{ClaimErrorKind, ClaimFailure};
pub use condition::{ClaimCondition, NATIVE_TOKEN};
pub use error::ValidationError;
pub use proof::{
    AllowlistEntry, AllowlistProof, OPTIMISTIC_WARNING, ProofData, USDC_BASE, resolve_terms,
};
pub use validation::{
    MAX_PER_TRANSACTION, SUPPORTED_CHAIN_IDS, is_supported_chain, parse_address,
    validate_chain, validate_claim_params, validate_quantity,
};
