use alloy_primitives::Address;

/// Input validation error for claim parameters and deployment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAddress(String),
    InvalidQuantity { quantity: u64, max: u64 },
    RecipientMismatch { wallet: Address, recipient: Address },
    UnsupportedChain(u64),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress(raw) => write!(f, "invalid wallet address format: {raw}"),
            Self::InvalidQuantity { max, .. } => {
                write!(f, "invalid quantity. Must be between 1 and {max}")
            }
            Self::RecipientMismatch { .. } => write!(f, "cannot claim for another address"),
            Self::UnsupportedChain(id) => write!(f, "unsupported chain id {id}"),
        }
    }
}

impl std::error::Error for ValidationError {}
