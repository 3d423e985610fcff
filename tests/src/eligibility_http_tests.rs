//! Eligibility endpoints against a stubbed drop contract.

use alloy_primitives::B256;
use anyhow::Result;
use axum::http::StatusCode;
use claim_gateway::sdk::ProofError;
use serde_json::json;

use crate::utils::{condition, get, post_json, proof, test_app, StubSdk, ROOT, WALLET};

#[tokio::test]
async fn test_public_phase_is_allowed_without_proof_lookup() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(B256::ZERO))))?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["isLoading"], false);
    assert_eq!(res.body["isAllowed"], true);
    assert!(res.body["allowlistEntry"].is_null());
    assert_eq!(res.body["reason"], "public");
    assert_eq!(app.sdk.proof_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_missing_proof_is_denied() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(ROOT))))?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;

    assert_eq!(res.body["isAllowed"], false);
    assert!(res.body["allowlistEntry"].is_null());
    assert!(res.body["error"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_confirmed_proof_reports_max_claimable() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(ROOT)));
    *sdk.proof.lock().unwrap() = Ok(Some(proof(3)));
    let app = test_app(sdk)?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;

    assert_eq!(res.body["isAllowed"], true);
    assert_eq!(res.body["allowlistEntry"]["maxClaimable"], 3);
    assert_eq!(
        res.body["allowlistEntry"]["recipient"]
            .as_str()
            .map(str::to_lowercase),
        Some(WALLET.to_string())
    );
    assert_eq!(res.body["reason"], "proof_confirmed");
    Ok(())
}

#[tokio::test]
async fn test_malformed_address_error_is_optimistic() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(ROOT)));
    *sdk.proof.lock().unwrap() = Err(ProofError::MalformedAddress(
        "Invalid address: undefined".into(),
    ));
    let app = test_app(sdk)?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;

    assert_eq!(res.body["isAllowed"], true);
    let warning = res.body["allowlistEntry"]["warning"].as_str().unwrap_or("");
    assert!(!warning.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_verification_outage_is_optimistic_and_silent() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(ROOT)));
    *sdk.proof.lock().unwrap() = Ok(Some(proof(2)));
    *sdk.verify.lock().unwrap() = Err(claim_gateway::Error::Rpc("network unreachable".into()));
    let app = test_app(sdk)?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;

    assert_eq!(res.body["isAllowed"], true);
    assert!(res.body["error"].is_null());
    assert_eq!(res.body["retryable"], false);
    Ok(())
}

#[tokio::test]
async fn test_sync_failure_is_retryable_and_refetch_recovers() -> Result<()> {
    let sdk = StubSdk::new(None);
    *sdk.condition.lock().unwrap() = Err(claim_gateway::Error::Rpc("connection reset".into()));
    let app = test_app(sdk)?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;
    assert_eq!(res.body["retryable"], true);
    assert!(res.body["error"].as_str().unwrap_or("").contains("connection reset"));

    *app.sdk.condition.lock().unwrap() = Ok(Some(condition(B256::ZERO)));
    let res = post_json(&app.router, &format!("/eligibility/{WALLET}/refetch"), json!({})).await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["isAllowed"], true);
    assert!(res.body["error"].is_null());
    assert_eq!(res.body["generation"], 2);
    Ok(())
}

#[tokio::test]
async fn test_refetch_twice_is_stable() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(ROOT)));
    *sdk.proof.lock().unwrap() = Ok(Some(proof(3)));
    let app = test_app(sdk)?;
    let uri = format!("/eligibility/{WALLET}/refetch");

    let first = post_json(&app.router, &uri, json!({})).await?;
    let second = post_json(&app.router, &uri, json!({})).await?;

    assert_eq!(first.body["isAllowed"], second.body["isAllowed"]);
    assert_eq!(first.body["allowlistEntry"], second.body["allowlistEntry"]);
    assert_eq!(app.state.registry.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_invalid_wallet_is_rejected() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(B256::ZERO))))?;

    let res = get(&app.router, "/eligibility/0x1234").await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    assert_eq!(app.state.registry.len(), 0);
    Ok(())
}

#[tokio::test]
async fn test_no_active_phase() -> Result<()> {
    let app = test_app(StubSdk::new(None))?;

    let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;
    assert_eq!(res.body["error"], "No active claim phase");
    assert_eq!(res.body["retryable"], false);

    let res = get(&app.router, "/phase").await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}
