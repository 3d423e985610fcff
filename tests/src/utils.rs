use alloy_primitives::{Address, B256, U256};
use anyhow::Result;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use claim_gateway::sdk::{ClaimSdk, ProofError, TxHash, VerifyClaim};
use claim_gateway::{create_router, AppState, Config};
use drop_types::{ClaimCondition, ProofData};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const WALLET: &str = "0x1111111111111111111111111111111111111111";
pub const ROOT: B256 = B256::repeat_byte(0xab);

pub fn condition(merkle_root: B256) -> ClaimCondition {
    ClaimCondition {
        id: U256::from(1),
        start_timestamp: 1_735_689_600,
        max_claimable_supply: U256::from(1_000),
        supply_claimed: U256::from(250),
        quantity_limit_per_wallet: U256::from(3),
        merkle_root,
        price_per_token: U256::from(10_000_000u64),
        currency: drop_types::USDC_BASE,
        metadata: String::new(),
    }
}

pub fn proof(max_quantity: u64) -> ProofData {
    ProofData {
        proof: vec![B256::repeat_byte(0x01), B256::repeat_byte(0x02)],
        max_quantity_in_proof: Some(U256::from(max_quantity)),
        ..ProofData::default()
    }
}

/// Scriptable in-memory drop contract and proof service.
pub struct StubSdk {
    pub condition: Mutex<Result<Option<ClaimCondition>, claim_gateway::Error>>,
    pub proof: Mutex<Result<Option<ProofData>, ProofError>>,
    pub verify: Mutex<Result<bool, claim_gateway::Error>>,
    pub claim: Mutex<Result<TxHash, claim_gateway::Error>>,
    pub proof_calls: AtomicUsize,
    pub claim_calls: AtomicUsize,
}

impl StubSdk {
    pub fn new(condition: Option<ClaimCondition>) -> Self {
        Self {
            condition: Mutex::new(Ok(condition)),
            proof: Mutex::new(Ok(None)),
            verify: Mutex::new(Ok(true)),
            claim: Mutex::new(Ok(B256::repeat_byte(0x99))),
            proof_calls: AtomicUsize::new(0),
            claim_calls: AtomicUsize::new(0),
        }
    }

    pub fn proof_calls(&self) -> usize {
        self.proof_calls.load(Ordering::SeqCst)
    }

    pub fn claim_calls(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }
}

impl ClaimSdk for StubSdk {
    async fn active_claim_condition(
        &self,
        _token_id: U256,
    ) -> Result<Option<ClaimCondition>, claim_gateway::Error> {
        self.condition.lock().unwrap().clone()
    }

    async fn fetch_proof(
        &self,
        _recipient: Address,
        _merkle_root: B256,
    ) -> Result<Option<ProofData>, ProofError> {
        self.proof_calls.fetch_add(1, Ordering::SeqCst);
        self.proof.lock().unwrap().clone()
    }

    async fn verify_claim(&self, _request: VerifyClaim) -> Result<bool, claim_gateway::Error> {
        self.verify.lock().unwrap().clone()
    }

    async fn claim(
        &self,
        _token_id: U256,
        _quantity: u64,
        _recipient: Address,
    ) -> Result<TxHash, claim_gateway::Error> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        self.claim.lock().unwrap().clone()
    }
}

pub struct TestApp {
    pub sdk: Arc<StubSdk>,
    pub state: Arc<AppState<StubSdk>>,
    pub router: Router,
}

pub fn test_app(sdk: StubSdk) -> Result<TestApp> {
    let sdk = Arc::new(sdk);
    let config = Config {
        chain_id: 8453,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config, Arc::clone(&sdk))?);
    state.mark_ready();
    let router = create_router(Arc::clone(&state));
    Ok(TestApp { sdk, state, router })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn get(router: &Router, uri: &str) -> Result<TestResponse> {
    send(router, Request::get(uri).body(Body::empty())?).await
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> Result<TestResponse> {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;
    send(router, request).await
}

pub async fn send(router: &Router, request: Request<Body>) -> Result<TestResponse> {
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    Ok(TestResponse {
        status,
        headers,
        body,
    })
}
