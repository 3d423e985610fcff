//! Input validation for claim requests and deployment settings.

use alloy_primitives::{Address, hex};

use crate::ValidationError;

/// Max units per claim transaction.
pub const MAX_PER_TRANSACTION: u64 = 10;

/// Base mainnet and Base Sepolia.
pub const SUPPORTED_CHAIN_IDS: [u64; 2] = [8453, 84532];

/// Parse a `0x`-prefixed, 40-hex-char address.
pub fn parse_address(raw: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::InvalidAddress(raw.to_string());
    let digits = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 {
        return Err(invalid());
    }
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
    Ok(Address::from(bytes))
}

pub fn validate_quantity(quantity: u64, max: u64) -> Result<(), ValidationError> {
    if quantity == 0 || quantity > max {
        return Err(ValidationError::InvalidQuantity { quantity, max });
    }
    Ok(())
}

/// Quantity must be in range and the wallet may only claim for itself.
pub fn validate_claim_params(
    quantity: u64,
    recipient: Address,
    wallet: Address,
    max: u64,
) -> Result<(), ValidationError> {
    validate_quantity(quantity, max)?;
    if recipient != wallet {
        return Err(ValidationError::RecipientMismatch { wallet, recipient });
    }
    Ok(())
}

pub fn is_supported_chain(chain_id: u64) -> bool {
    SUPPORTED_CHAIN_IDS.contains(&chain_id)
}

pub fn validate_chain(chain_id: u64) -> Result<(), ValidationError> {
    if !is_supported_chain(chain_id) {
        return Err(ValidationError::UnsupportedChain(chain_id));
    }
    Ok(())
}
