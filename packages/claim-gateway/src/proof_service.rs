//! HTTP client for the off-chain allowlist proof service.

use alloy_primitives::{hex, Address, B256};
use drop_types::ProofData;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use crate::sdk::ProofError;

/// Message the service emits when it cannot parse the recipient address.
const MALFORMED_ADDRESS_SIGNATURE: &str = "Invalid address";

pub struct ProofServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProofServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/proofs/{root}/{address}`.
    pub async fn fetch_proof(
        &self,
        recipient: Address,
        merkle_root: B256,
    ) -> Result<Option<ProofData>, ProofError> {
        let url = format!(
            "{}/proofs/{}/{}",
            self.base_url,
            hex::encode_prefixed(merkle_root),
            hex::encode_prefixed(recipient)
        );
        debug!(url = %url, "Fetching allowlist proof");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProofError::Service(format!("transport: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProofError::Service(format!("reading body: {e}")))?;

        interpret_response(status, &body)
    }
}

fn interpret_response(status: StatusCode, body: &str) -> Result<Option<ProofData>, ProofError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        if body.contains(MALFORMED_ADDRESS_SIGNATURE) {
            return Err(ProofError::MalformedAddress(body.to_string()));
        }
        return Err(ProofError::Service(format!("HTTP {status}: {body}")));
    }
    let proof: Option<ProofData> = serde_json::from_str(body)
        .map_err(|e| ProofError::Service(format!("undecodable proof: {e}")))?;
    Ok(proof)
}
