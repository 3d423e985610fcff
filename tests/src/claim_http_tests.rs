//! Claim, phase and operational endpoints.

use alloy_primitives::B256;
use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use std::time::Duration;

use crate::utils::{condition, get, post_json, send, test_app, StubSdk, ROOT, WALLET};

#[tokio::test]
async fn test_claim_success_returns_tx_hash_and_resyncs() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(B256::ZERO))))?;

    let res = post_json(
        &app.router,
        "/claim",
        json!({ "wallet": WALLET, "quantity": 2 }),
    )
    .await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(
        res.body["txHash"],
        format!("0x{}", "99".repeat(32)).as_str()
    );
    assert_eq!(app.sdk.claim_calls(), 1);

    // The resync runs in the background.
    let mut synced = false;
    for _ in 0..50 {
        let res = get(&app.router, &format!("/eligibility/{WALLET}")).await?;
        if res.body["isAllowed"] == true {
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(synced);
    Ok(())
}

#[tokio::test]
async fn test_claim_not_allowlisted_is_classified() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(ROOT)));
    *sdk.claim.lock().unwrap() = Err(claim_gateway::Error::Reverted("!InvalidMerkleProof".into()));
    let app = test_app(sdk)?;

    let res = post_json(
        &app.router,
        "/claim",
        json!({ "wallet": WALLET, "recipient": WALLET, "quantity": 1 }),
    )
    .await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["error"]["kind"], "not_allowlisted");
    assert_eq!(res.body["error"]["should_update_allowed_state"], true);
    Ok(())
}

#[tokio::test]
async fn test_claim_node_error_keeps_its_message() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(B256::ZERO)));
    *sdk.claim.lock().unwrap() = Err(claim_gateway::Error::Rpc("-32000: nonce too low".into()));
    let app = test_app(sdk)?;

    let request = Request::post("/claim")
        .header("content-type", "application/json")
        .header("x-request-id", "claim-7")
        .body(Body::from(json!({ "wallet": WALLET, "quantity": 1 }).to_string()))?;
    let res = send(&app.router, request).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.headers["x-request-id"], "claim-7");
    assert_eq!(res.body["error"]["kind"], "generic");
    assert_eq!(res.body["error"]["user_message"], "-32000: nonce too low");
    assert_eq!(res.body["error"]["should_retry"], true);
    Ok(())
}

#[tokio::test]
async fn test_claim_gas_failure_is_classified() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(B256::ZERO)));
    *sdk.claim.lock().unwrap() = Err(claim_gateway::Error::Rpc(
        "-32000: gas required exceeds allowance (30000000)".into(),
    ));
    let app = test_app(sdk)?;

    let res = post_json(&app.router, "/claim", json!({ "wallet": WALLET, "quantity": 1 })).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["kind"], "gas_estimation");
    Ok(())
}

#[tokio::test]
async fn test_claim_validation() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(B256::ZERO))))?;

    for body in [
        json!({ "wallet": WALLET, "quantity": 0 }),
        json!({ "wallet": WALLET, "quantity": 11 }),
        json!({ "wallet": WALLET, "recipient": "0x2222222222222222222222222222222222222222", "quantity": 1 }),
        json!({ "wallet": "not-an-address", "quantity": 1 }),
    ] {
        let res = post_json(&app.router, "/claim", body).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", res.body);
        assert_eq!(res.body["success"], false);
    }
    assert_eq!(app.sdk.claim_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_claim_attempts_are_limited() -> Result<()> {
    let sdk = StubSdk::new(Some(condition(B256::ZERO)));
    *sdk.claim.lock().unwrap() = Err(claim_gateway::Error::Rpc("user rejected the request".into()));
    let app = test_app(sdk)?;

    for _ in 0..6 {
        let res = post_json(&app.router, "/claim", json!({ "wallet": WALLET, "quantity": 1 })).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }
    let res = post_json(&app.router, "/claim", json!({ "wallet": WALLET, "quantity": 1 })).await?;

    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.sdk.claim_calls(), 6);
    Ok(())
}

#[tokio::test]
async fn test_phase_summary() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(ROOT))))?;

    let res = get(&app.router, "/phase").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["isPublic"], false);
    assert_eq!(res.body["remainingSupply"], "0x2ee");
    assert_eq!(res.body["pricePerToken"], "0x989680");
    assert_eq!(res.body["nativeCurrency"], false);
    Ok(())
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(B256::ZERO))))?;

    let res = get(&app.router, "/health").await?;
    let generated = res.headers["x-request-id"].to_str()?;
    assert!(generated.starts_with("clm-"));
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["chain_id"], 8453);

    let request = Request::get("/ready")
        .header("x-request-id", "trace-42")
        .body(Body::empty())?;
    let res = send(&app.router, request).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers["x-request-id"], "trace-42");
    Ok(())
}

#[tokio::test]
async fn test_metrics_exposition() -> Result<()> {
    let app = test_app(StubSdk::new(Some(condition(B256::ZERO))))?;
    get(&app.router, &format!("/eligibility/{WALLET}")).await?;

    let res = get(&app.router, "/metrics").await?;

    assert_eq!(res.status, StatusCode::OK);
    let text = res.body.as_str().unwrap_or("");
    assert!(text.contains("claim_gateway_sync_total"));
    assert!(text.contains("claim_gateway_tracked_wallets 1\n"));
    Ok(())
}
