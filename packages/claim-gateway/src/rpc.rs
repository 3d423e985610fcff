//! EVM JSON-RPC client with primary → fallback failover and circuit breaker.
//!
//! Reads go to the primary endpoint (fallback while the breaker is open).
//! Writes go to the wallet endpoint only: it holds the claimer's keys and
//! signs `eth_sendTransaction` itself.

use alloy_primitives::{hex, Address, Bytes, B256, U256, U64};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

use crate::metrics::METRICS;

const CIRCUIT_BREAKER_THRESHOLD: u64 = 5;
const CIRCUIT_BREAKER_WINDOW_MS: u64 = 30_000;

/// JSON-RPC error code for a reverted call (EIP-1474).
const EXECUTION_REVERTED: i64 = 3;

struct CircuitState {
    failures: u64,
    last_failure_ms: u64,
    open: bool,
}

/// Transaction for the wallet endpoint to sign and broadcast.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// RPC client with primary → fallback failover.
pub struct RpcClient {
    http: reqwest::Client,
    primary_url: String,
    fallback_url: String,
    wallet_url: String,
    circuit: Mutex<CircuitState>,
    total_failovers: AtomicU64,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(
        primary_url: &str,
        fallback_url: &str,
        wallet_url: &str,
        timeout: Duration,
    ) -> Result<Self, crate::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| crate::Error::Config(format!("Failed to build HTTP client: {e}")))?;
        info!(
            primary = primary_url,
            fallback = fallback_url,
            wallet = wallet_url,
            "RPC client initialized with failover"
        );
        Ok(Self {
            http,
            primary_url: primary_url.to_string(),
            fallback_url: fallback_url.to_string(),
            wallet_url: wallet_url.to_string(),
            circuit: Mutex::new(CircuitState {
                failures: 0,
                last_failure_ms: 0,
                open: false,
            }),
            total_failovers: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn primary_url(&self) -> &str {
        &self.primary_url
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    // --- Reads ---

    /// `eth_call` against the latest block. Reverts are returned as
    /// [`crate::Error::Reverted`] and never trigger failover.
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> Result<Bytes, crate::Error> {
        let params = json!([
            { "to": to, "data": hex::encode_prefixed(data) },
            "latest"
        ]);
        self.request("eth_call", params).await
    }

    pub async fn chain_id(&self) -> Result<u64, crate::Error> {
        let id: U64 = self.request("eth_chainId", json!([])).await?;
        Ok(id.to::<u64>())
    }

    // --- Writes ---

    /// Hand a transaction to the wallet endpoint. Returns the tx hash.
    /// No failover: a public fallback node cannot sign for the wallet.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<B256, crate::Error> {
        let params = json!([{
            "from": tx.from,
            "to": tx.to,
            "data": tx.data,
            "value": format!("{:#x}", tx.value),
        }]);
        let result = self.call_endpoint(&self.wallet_url, "eth_sendTransaction", params).await?;
        serde_json::from_value(result)
            .map_err(|e| crate::Error::Rpc(format!("invalid tx hash in response: {e}")))
    }

    /// Quick connectivity check. Returns "ok", "degraded", or error.
    pub async fn health_check(&self) -> Result<&'static str, crate::Error> {
        match self
            .call_endpoint(&self.primary_url, "eth_blockNumber", json!([]))
            .await
        {
            Ok(_) => Ok("ok"),
            Err(_) => match self
                .call_endpoint(&self.fallback_url, "eth_blockNumber", json!([]))
                .await
            {
                Ok(_) => Ok("degraded"),
                Err(e) => Err(crate::Error::Rpc(format!("Both RPCs unreachable: {e}"))),
            },
        }
    }

    // --- Transport ---

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, crate::Error> {
        let result = match self.call_endpoint(self.active_url(), method, params.clone()).await {
            Ok(v) => {
                self.record_success();
                v
            }
            Err(e @ crate::Error::Reverted(_)) => {
                self.record_success();
                return Err(e);
            }
            Err(e) => {
                self.record_failure();
                warn!(method, error = %e, "Primary RPC failed, trying fallback");
                match self.call_endpoint(&self.fallback_url, method, params).await {
                    Ok(v) => v,
                    Err(e2 @ crate::Error::Reverted(_)) => return Err(e2),
                    Err(e2) => {
                        return Err(crate::Error::Rpc(format!(
                            "{method} failed on both RPCs: primary={e}, fallback={e2}"
                        )))
                    }
                }
            }
        };
        serde_json::from_value(result)
            .map_err(|e| crate::Error::Rpc(format!("unexpected {method} result: {e}")))
    }

    async fn call_endpoint(
        &self,
        url: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, crate::Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| crate::Error::Rpc(format!("{method} network error: {e}")))?;
        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| crate::Error::Rpc(format!("{method} network error (HTTP {status}): {e}")))?;

        parse_response(payload)
    }

    // --- Failover / circuit breaker ---

    fn active_url(&self) -> &str {
        if self.is_circuit_open() {
            &self.fallback_url
        } else {
            &self.primary_url
        }
    }

    fn record_success(&self) {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if circuit.failures > 0 {
            info!(primary = %self.primary_url, "Primary RPC recovered");
            circuit.failures = 0;
            circuit.open = false;
        }
    }

    fn record_failure(&self) {
        METRICS.rpc_errors.fetch_add(1, Ordering::Relaxed);
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        circuit.failures += 1;
        circuit.last_failure_ms = now_ms();
        if circuit.failures >= CIRCUIT_BREAKER_THRESHOLD && !circuit.open {
            circuit.open = true;
            self.total_failovers.fetch_add(1, Ordering::Relaxed);
            METRICS.rpc_failovers.fetch_add(1, Ordering::Relaxed);
            warn!(
                failures = circuit.failures,
                fallback = %self.fallback_url,
                "Circuit breaker opened, routing to fallback"
            );
        }
    }

    pub fn is_circuit_open(&self) -> bool {
        let mut circuit = self.circuit.lock().unwrap_or_else(|e| e.into_inner());
        if !circuit.open {
            return false;
        }
        if now_ms().saturating_sub(circuit.last_failure_ms) > CIRCUIT_BREAKER_WINDOW_MS {
            circuit.open = false;
            circuit.failures = 0;
            info!(primary = %self.primary_url, "Circuit breaker half-open, retrying primary");
            return false;
        }
        true
    }

    pub fn failover_count(&self) -> u64 {
        self.total_failovers.load(Ordering::Relaxed)
    }

    /// Currently active read URL.
    pub fn active_rpc_url(&self) -> &str {
        self.active_url()
    }
}

/// Split a JSON-RPC response into result or typed error.
fn parse_response(payload: Value) -> Result<Value, crate::Error> {
    if let Some(err) = payload.get("error") {
        let code = err.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        if code == EXECUTION_REVERTED || message.contains("revert") {
            let data = err.get("data").and_then(revert_data);
            return Err(crate::Error::Reverted(revert_reason(message, data.as_deref())));
        }
        return Err(crate::Error::Rpc(format!("{code}: {message}")));
    }
    payload
        .get("result")
        .cloned()
        .ok_or_else(|| crate::Error::Rpc("response has neither result nor error".into()))
}

/// Nodes put revert data either directly in `data` or under `data.data`.
fn revert_data(data: &Value) -> Option<Vec<u8>> {
    let raw = data
        .as_str()
        .or_else(|| data.get("data").and_then(Value::as_str))?;
    hex::decode(raw).ok()
}

fn revert_reason(message: &str, data: Option<&[u8]>) -> String {
    data.and_then(crate::contract::decode_revert)
        .unwrap_or_else(|| {
            message
                .strip_prefix("execution reverted: ")
                .unwrap_or(message)
                .to_string()
        })
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
