//! # Claim Gateway
//!
//! Allowlist eligibility and claim submission for an ERC-1155 drop.
//! Resolves each wallet's eligibility against the active claim phase and
//! the off-chain proof service, then forwards claims to a wallet node.
//!
//! ## Endpoints
//! - `GET /health` - Health check with upstream diagnostics
//! - `GET /ready` - 200 once the network check passed
//! - `GET /metrics` - Prometheus metrics
//! - `GET /phase` - Active claim phase
//! - `GET /eligibility/{wallet}` - Eligibility view for a wallet
//! - `POST /eligibility/{wallet}/refetch` - Re-run the eligibility sync
//! - `POST /claim` - Submit a claim (API key protected)

pub mod allowlist;
pub mod claim;
pub mod config;
pub mod contract;
mod error;
mod handlers;
pub mod limiter;
pub mod metrics;
pub mod middleware;
pub mod proof_service;
mod response;
mod router;
pub mod rpc;
pub mod sdk;
mod state;

pub use config::Config;
pub use contract::DropClient;
pub use error::Error;
pub use router::create as create_router;
pub use state::AppState;
