//! HTTP request handlers.

use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::{
    ClaimResponse, EligibilityResponse, HealthResponse, PhaseResponse, ReadyResponse,
};
use crate::sdk::ClaimSdk;
use crate::state::AppState;
use alloy_primitives::Address;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use drop_types::parse_address;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// Health check with upstream diagnostics.
pub async fn health<S: ClaimSdk>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    let endpoint = state.sdk.endpoint_status();
    Json(HealthResponse {
        status: if state.is_ready() { "ok" } else { "starting" },
        chain_id: state.config.chain_id,
        contract: state.config.contract_address.clone(),
        active_rpc: endpoint.active_rpc,
        failovers: endpoint.failovers,
        tracked_wallets: state.registry.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

pub async fn ready<S: ClaimSdk>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    let ready = state.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadyResponse { ready }))
}

pub async fn metrics<S: ClaimSdk>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.render(state.registry.len()),
    )
}

/// Active claim phase summary.
pub async fn phase<S: ClaimSdk>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Response, crate::Error> {
    let condition = state
        .sdk
        .active_claim_condition(state.config.token())
        .await?;
    let response = match condition {
        Some(condition) => {
            let fallback = state.config.fallback_currency()?;
            Json(PhaseResponse::new(&condition, fallback)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "success": false, "error": "No active claim phase" })),
        )
            .into_response(),
    };
    Ok(response)
}

/// Current eligibility. The first request for a wallet waits for its sync.
pub async fn eligibility<S: ClaimSdk>(
    State(state): State<Arc<AppState<S>>>,
    Path(wallet): Path<String>,
) -> Result<Json<EligibilityResponse>, crate::Error> {
    let wallet = parse_address(&wallet)?;
    let (sync, created) = state.registry.get_or_insert(wallet);
    let snapshot = if created {
        debug!(wallet = %wallet, "Starting initial eligibility sync");
        // Detached so the first sync completes even if this client goes away.
        sync.spawn_refetch();
        sync.settled().await
    } else {
        sync.snapshot()
    };
    Ok(Json(EligibilityResponse {
        wallet,
        generation: snapshot.generation,
        view: snapshot.state.view(),
    }))
}

pub async fn refetch<S: ClaimSdk>(
    State(state): State<Arc<AppState<S>>>,
    Path(wallet): Path<String>,
) -> Result<Json<EligibilityResponse>, crate::Error> {
    let wallet = parse_address(&wallet)?;
    let (sync, _) = state.registry.get_or_insert(wallet);
    let snapshot = sync.refetch().await;
    Ok(Json(EligibilityResponse {
        wallet,
        generation: snapshot.generation,
        view: snapshot.state.view(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub wallet: String,
    #[serde(default)]
    pub recipient: Option<String>,
    pub quantity: u64,
}

/// Submit a claim for the connected wallet. Claim logs carry the request id.
pub async fn claim<S: ClaimSdk>(
    State(state): State<Arc<AppState<S>>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Json(request): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), crate::Error> {
    let wallet = parse_address(&request.wallet)?;
    let recipient: Option<Address> = request
        .recipient
        .as_deref()
        .map(parse_address)
        .transpose()?;

    let span = info_span!("claim", request_id = %request_id);
    info!(parent: &span, wallet = %wallet, quantity = request.quantity, "Claim requested");
    let outcome = state
        .claims
        .claim(wallet, recipient, request.quantity)
        .instrument(span)
        .await?;

    let response = ClaimResponse::from(outcome);
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(response)))
}
