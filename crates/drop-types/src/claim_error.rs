//! Classification of claim submission failures.
//!
//! Wallet and contract errors only arrive as free text, so the message is
//! matched exactly once here and everything downstream branches on
//! [`ClaimErrorKind`].

use serde::Serialize;

const MAX_ECHOED_MESSAGE_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimErrorKind {
    /// `DropClaimExceedLimit`: the wallet used its whole allocation.
    AllocationExceeded,
    NotAllowlisted,
    LimitExceeded,
    InsufficientFunds,
    UserRejected,
    Network,
    GasEstimation,
    Generic,
}

impl ClaimErrorKind {
    /// First match wins; patterns are checked against the lowercased message.
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| msg.contains(n));

        if has(&["dropclaimexceedlimit"]) {
            Self::AllocationExceeded
        } else if has(&["not allowlisted", "notallowlisted", "invalidmerkleproof"]) {
            Self::NotAllowlisted
        } else if has(&["exceeded", "limit"]) {
            Self::LimitExceeded
        } else if has(&["insufficient funds", "insufficient balance"]) {
            Self::InsufficientFunds
        } else if has(&["user rejected", "user denied", "rejected"]) {
            Self::UserRejected
        } else if has(&["network", "rpc", "timeout"]) {
            Self::Network
        } else if has(&["gas", "estimation"]) {
            Self::GasEstimation
        } else {
            Self::Generic
        }
    }

    /// Whether the failure says something new about eligibility.
    pub fn should_update_allowed_state(self) -> bool {
        matches!(
            self,
            Self::AllocationExceeded | Self::NotAllowlisted | Self::LimitExceeded
        )
    }

    pub fn should_retry(self) -> bool {
        !self.should_update_allowed_state()
    }

    pub fn user_message(self) -> &'static str {
        match self {
            Self::AllocationExceeded => {
                "You have already claimed your maximum allocation or the claim limit has been reached."
            }
            Self::NotAllowlisted => {
                "You are not eligible to claim. Make sure you're using the correct wallet address."
            }
            Self::LimitExceeded => {
                "Claim limit exceeded. You may have already reached your maximum allocation."
            }
            Self::InsufficientFunds => {
                "Insufficient funds in your wallet. Please add more USDC and try again."
            }
            Self::UserRejected => {
                "Transaction was cancelled. Please try again if you want to claim."
            }
            Self::Network => "Network error occurred. Please check your connection and try again.",
            Self::GasEstimation => "Transaction failed due to gas estimation. Please try again.",
            Self::Generic => {
                "Transaction failed. Please try again or contact support if the issue persists."
            }
        }
    }
}

/// User-facing outcome of a failed claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimFailure {
    pub kind: ClaimErrorKind,
    pub user_message: String,
    pub should_update_allowed_state: bool,
    pub should_retry: bool,
}

impl ClaimFailure {
    pub fn from_message(message: &str) -> Self {
        let kind = ClaimErrorKind::classify(message);
        let user_message = match kind {
            ClaimErrorKind::Generic
                if !message.is_empty() && message.len() < MAX_ECHOED_MESSAGE_LEN =>
            {
                message.to_string()
            }
            _ => kind.user_message().to_string(),
        };
        Self {
            kind,
            user_message,
            should_update_allowed_state: kind.should_update_allowed_state(),
            should_retry: kind.should_retry(),
        }
    }
}
