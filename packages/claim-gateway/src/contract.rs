//! Drop contract bindings and the concrete [`ClaimSdk`] over JSON-RPC.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, Revert, SolCall, SolError, SolInterface, SolValue};
use drop_types::{resolve_terms, AllowlistProof, ClaimCondition, ProofData};
use tracing::{debug, info};

use crate::proof_service::ProofServiceClient;
use crate::rpc::{RpcClient, TransactionRequest};
use crate::sdk::{ClaimSdk, EndpointStatus, ProofError, TxHash, VerifyClaim};

sol! {
    interface IDropERC1155 {
        struct ClaimCondition {
            uint256 startTimestamp;
            uint256 maxClaimableSupply;
            uint256 supplyClaimed;
            uint256 quantityLimitPerWallet;
            bytes32 merkleRoot;
            uint256 pricePerToken;
            address currency;
            string metadata;
        }

        struct AllowlistProof {
            bytes32[] proof;
            uint256 maxQuantityInProof;
            uint256 pricePerToken;
            address currency;
        }

        function getActiveClaimConditionId(uint256 tokenId) external view returns (uint256 conditionId);

        function getClaimConditionById(uint256 tokenId, uint256 conditionId) external view returns (ClaimCondition memory condition);

        function verifyClaim(
            uint256 conditionId,
            address claimer,
            uint256 tokenId,
            uint256 quantity,
            address currency,
            uint256 pricePerToken,
            AllowlistProof calldata allowlistProof
        ) external view returns (bool isOverride);

        function claim(
            address receiver,
            uint256 tokenId,
            uint256 quantity,
            address currency,
            uint256 pricePerToken,
            AllowlistProof calldata allowlistProof,
            bytes data
        ) external payable;

        error DropClaimExceedLimit(uint256 expected, uint256 actual);
        error DropClaimExceedMaxSupply(uint256 expected, uint256 actual);
        error DropClaimInvalidTokenPrice(address expectedCurrency, uint256 expectedPricePerToken, address actualCurrency, uint256 actualExpectedPricePerToken);
        error DropClaimNotStarted(uint256 expected, uint256 actual);
        error DropNoActiveCondition();
    }
}

use IDropERC1155::IDropERC1155Errors as DropError;

impl From<&AllowlistProof> for IDropERC1155::AllowlistProof {
    fn from(p: &AllowlistProof) -> Self {
        Self {
            proof: p.proof.clone(),
            maxQuantityInProof: p.max_quantity_in_proof,
            pricePerToken: p.price_per_token,
            currency: p.currency,
        }
    }
}

/// Human-readable revert reason: custom drop errors by name, else `Error(string)`.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if let Ok(err) = DropError::abi_decode(data) {
        let reason = match err {
            DropError::DropClaimExceedLimit(e) => {
                format!("DropClaimExceedLimit(expected {}, actual {})", e.expected, e.actual)
            }
            DropError::DropClaimExceedMaxSupply(e) => {
                format!("DropClaimExceedMaxSupply(expected {}, actual {})", e.expected, e.actual)
            }
            DropError::DropClaimInvalidTokenPrice(_) => "DropClaimInvalidTokenPrice".to_string(),
            DropError::DropClaimNotStarted(e) => {
                format!("DropClaimNotStarted(starts {}, now {})", e.expected, e.actual)
            }
            DropError::DropNoActiveCondition(_) => "DropNoActiveCondition".to_string(),
        };
        return Some(reason);
    }
    Revert::abi_decode(data).ok().map(|r| r.reason)
}

fn into_condition(id: U256, c: IDropERC1155::ClaimCondition) -> ClaimCondition {
    ClaimCondition {
        id,
        start_timestamp: u64::try_from(c.startTimestamp).unwrap_or(u64::MAX),
        max_claimable_supply: c.maxClaimableSupply,
        supply_claimed: c.supplyClaimed,
        quantity_limit_per_wallet: c.quantityLimitPerWallet,
        merkle_root: c.merkleRoot,
        price_per_token: c.pricePerToken,
        currency: c.currency,
        metadata: c.metadata,
    }
}

/// Drop contract reached through [`RpcClient`], proofs through [`ProofServiceClient`].
pub struct DropClient {
    rpc: RpcClient,
    proofs: ProofServiceClient,
    contract: Address,
    fallback_currency: Address,
}

impl DropClient {
    pub fn new(
        rpc: RpcClient,
        proofs: ProofServiceClient,
        contract: Address,
        fallback_currency: Address,
    ) -> Self {
        Self {
            rpc,
            proofs,
            contract,
            fallback_currency,
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// The RPC must serve the configured chain.
    pub async fn check_network(&self, expected_chain_id: u64) -> Result<(), crate::Error> {
        let chain_id = self.rpc.chain_id().await?;
        if chain_id != expected_chain_id {
            return Err(crate::Error::Config(format!(
                "RPC serves chain {chain_id}, expected {expected_chain_id}"
            )));
        }
        info!(chain_id, contract = %self.contract, "Network check passed");
        Ok(())
    }

    async fn call<C: SolCall>(&self, call: &C) -> Result<Bytes, crate::Error> {
        self.rpc.eth_call(self.contract, &call.abi_encode()).await
    }

    /// Proof tuple for a claim: empty for public phases, fetched otherwise.
    async fn claim_proof(
        &self,
        recipient: Address,
        condition: &ClaimCondition,
    ) -> Result<AllowlistProof, crate::Error> {
        if condition.is_public() {
            return Ok(AllowlistProof::public(condition));
        }
        let lookup = self.proofs.fetch_proof(recipient, condition.merkle_root).await;
        claim_proof_from(recipient, condition, lookup, self.fallback_currency)
    }
}

/// Proof tuple to claim with, given the proof service's answer for a gated phase.
fn claim_proof_from(
    recipient: Address,
    condition: &ClaimCondition,
    lookup: Result<Option<ProofData>, ProofError>,
    fallback_currency: Address,
) -> Result<AllowlistProof, crate::Error> {
    match lookup {
        Ok(Some(proof)) => Ok(resolve_terms(recipient, &proof, condition, fallback_currency).1),
        // Let the contract decide; it reverts with a classifiable reason.
        Ok(None) | Err(ProofError::MalformedAddress(_)) => Ok(AllowlistProof {
            proof: Vec::new(),
            max_quantity_in_proof: U256::ZERO,
            price_per_token: condition.price_per_token,
            currency: condition.currency().unwrap_or(fallback_currency),
        }),
        Err(e) => Err(e.into()),
    }
}

/// `claim` calldata and the native value to attach.
fn build_claim(
    recipient: Address,
    token_id: U256,
    quantity: u64,
    proof: &AllowlistProof,
) -> (IDropERC1155::claimCall, U256) {
    let quantity = U256::from(quantity);
    let value = if proof.currency == drop_types::NATIVE_TOKEN {
        proof.price_per_token.saturating_mul(quantity)
    } else {
        U256::ZERO
    };
    let call = IDropERC1155::claimCall {
        receiver: recipient,
        tokenId: token_id,
        quantity,
        currency: proof.currency,
        pricePerToken: proof.price_per_token,
        allowlistProof: proof.into(),
        data: Bytes::new(),
    };
    (call, value)
}

impl ClaimSdk for DropClient {
    async fn active_claim_condition(
        &self,
        token_id: U256,
    ) -> Result<Option<ClaimCondition>, crate::Error> {
        let raw = match self
            .call(&IDropERC1155::getActiveClaimConditionIdCall { tokenId: token_id })
            .await
        {
            Ok(raw) => raw,
            Err(crate::Error::Reverted(reason)) => {
                debug!(reason = %reason, "No active claim condition");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let condition_id = U256::abi_decode(&raw)
            .map_err(|e| crate::Error::Rpc(format!("bad getActiveClaimConditionId result: {e}")))?;

        let raw = self
            .call(&IDropERC1155::getClaimConditionByIdCall {
                tokenId: token_id,
                conditionId: condition_id,
            })
            .await?;
        let condition = IDropERC1155::ClaimCondition::abi_decode(&raw)
            .map_err(|e| crate::Error::Rpc(format!("bad getClaimConditionById result: {e}")))?;

        Ok(Some(into_condition(condition_id, condition)))
    }

    async fn fetch_proof(
        &self,
        recipient: Address,
        merkle_root: B256,
    ) -> Result<Option<ProofData>, ProofError> {
        self.proofs.fetch_proof(recipient, merkle_root).await
    }

    async fn verify_claim(&self, request: VerifyClaim) -> Result<bool, crate::Error> {
        let call = IDropERC1155::verifyClaimCall {
            conditionId: request.condition_id,
            claimer: request.claimer,
            tokenId: request.token_id,
            quantity: request.quantity,
            currency: request.currency,
            pricePerToken: request.price_per_token,
            allowlistProof: (&request.allowlist_proof).into(),
        };
        let raw = self.call(&call).await?;
        bool::abi_decode(&raw).map_err(|e| crate::Error::Rpc(format!("bad verifyClaim result: {e}")))
    }

    async fn claim(
        &self,
        token_id: U256,
        quantity: u64,
        recipient: Address,
    ) -> Result<TxHash, crate::Error> {
        let condition = self
            .active_claim_condition(token_id)
            .await?
            .ok_or_else(|| crate::Error::Reverted("DropNoActiveCondition".into()))?;
        let proof = self.claim_proof(recipient, &condition).await?;
        let (call, value) = build_claim(recipient, token_id, quantity, &proof);

        let tx = TransactionRequest {
            from: recipient,
            to: self.contract,
            data: call.abi_encode().into(),
            value,
        };
        let tx_hash = self.rpc.send_transaction(&tx).await?;
        debug!(tx_hash = %tx_hash, recipient = %recipient, quantity, "eth_sendTransaction accepted");
        Ok(tx_hash)
    }

    fn endpoint_status(&self) -> EndpointStatus {
        EndpointStatus {
            active_rpc: self.rpc.active_rpc_url().to_string(),
            failovers: self.rpc.failover_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_claim_calldata_selector() {
        let call = IDropERC1155::verifyClaimCall {
            conditionId: U256::from(1),
            claimer: Address::repeat_byte(0x11),
            tokenId: U256::ZERO,
            quantity: U256::from(1),
            currency: drop_types::USDC_BASE,
            pricePerToken: U256::from(25_000_000u64),
            allowlistProof: (&AllowlistProof {
                proof: vec![B256::repeat_byte(0xaa)],
                max_quantity_in_proof: U256::from(3),
                price_per_token: U256::from(25_000_000u64),
                currency: drop_types::USDC_BASE,
            })
                .into(),
        };
        let encoded = call.abi_encode();
        assert_eq!(&encoded[..4], IDropERC1155::verifyClaimCall::SELECTOR.as_slice());

        let decoded = IDropERC1155::verifyClaimCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.claimer, Address::repeat_byte(0x11));
        assert_eq!(decoded.allowlistProof.maxQuantityInProof, U256::from(3));
        assert_eq!(decoded.allowlistProof.proof, vec![B256::repeat_byte(0xaa)]);
    }

    #[test]
    fn test_claim_condition_decodes_from_return_data() {
        let onchain = IDropERC1155::ClaimCondition {
            startTimestamp: U256::from(1_735_689_600u64),
            maxClaimableSupply: U256::from(500),
            supplyClaimed: U256::from(20),
            quantityLimitPerWallet: U256::from(2),
            merkleRoot: B256::repeat_byte(0x42),
            pricePerToken: U256::from(1_000_000u64),
            currency: drop_types::USDC_BASE,
            metadata: "phase-1".into(),
        };
        let raw = onchain.abi_encode();

        let decoded = IDropERC1155::ClaimCondition::abi_decode(&raw).unwrap();
        let condition = into_condition(U256::from(4), decoded);

        assert_eq!(condition.id, U256::from(4));
        assert_eq!(condition.start_timestamp, 1_735_689_600);
        assert_eq!(condition.remaining_supply(), U256::from(480));
        assert!(!condition.is_public());
        assert_eq!(condition.metadata, "phase-1");
    }

    #[test]
    fn test_decode_custom_drop_error() {
        let data = IDropERC1155::DropClaimExceedLimit {
            expected: U256::from(1),
            actual: U256::from(2),
        }
        .abi_encode();
        let reason = decode_revert(&data).unwrap();
        assert!(reason.starts_with("DropClaimExceedLimit"), "{reason}");
        assert_eq!(
            drop_types::ClaimErrorKind::classify(&reason),
            drop_types::ClaimErrorKind::AllocationExceeded
        );
    }

    #[test]
    fn test_decode_revert_string() {
        let data = Revert {
            reason: "!PriceOrCurrency".into(),
        }
        .abi_encode();
        assert_eq!(decode_revert(&data).as_deref(), Some("!PriceOrCurrency"));
    }

    #[test]
    fn test_decode_unknown_data() {
        assert_eq!(decode_revert(&[0xde, 0xad, 0xbe, 0xef]), None);
    }

    const CLAIMER: Address = Address::repeat_byte(0x11);

    fn gated(currency: Address) -> ClaimCondition {
        ClaimCondition {
            id: U256::from(2),
            start_timestamp: 0,
            max_claimable_supply: U256::from(100),
            supply_claimed: U256::ZERO,
            quantity_limit_per_wallet: U256::from(1),
            merkle_root: B256::repeat_byte(0xab),
            price_per_token: U256::from(10_000_000u64),
            currency,
            metadata: String::new(),
        }
    }

    #[test]
    fn test_claim_uses_proof_price_and_currency() {
        let condition = gated(drop_types::USDC_BASE);
        let proof = ProofData {
            proof: vec![B256::repeat_byte(0x01)],
            max_quantity_in_proof: Some(U256::from(5)),
            price: Some(U256::from(7_000_000u64)),
            currency_address: Some(Address::repeat_byte(0x44)),
            ..ProofData::default()
        };

        let onchain =
            claim_proof_from(CLAIMER, &condition, Ok(Some(proof)), drop_types::USDC_BASE).unwrap();
        let (call, value) = build_claim(CLAIMER, U256::from(0), 2, &onchain);

        assert_eq!(value, U256::ZERO);
        let decoded = IDropERC1155::claimCall::abi_decode(&call.abi_encode()).unwrap();
        assert_eq!(decoded.receiver, CLAIMER);
        assert_eq!(decoded.quantity, U256::from(2));
        assert_eq!(decoded.pricePerToken, U256::from(7_000_000u64));
        assert_eq!(decoded.currency, Address::repeat_byte(0x44));
        assert_eq!(decoded.allowlistProof.proof, vec![B256::repeat_byte(0x01)]);
        assert_eq!(decoded.allowlistProof.maxQuantityInProof, U256::from(5));
        assert_eq!(decoded.allowlistProof.currency, Address::repeat_byte(0x44));
    }

    #[test]
    fn test_native_currency_attaches_value() {
        let condition = ClaimCondition {
            merkle_root: B256::ZERO,
            price_per_token: U256::from(1_000_000_000_000_000u64),
            ..gated(drop_types::NATIVE_TOKEN)
        };
        let onchain = AllowlistProof::public(&condition);

        let (call, value) = build_claim(CLAIMER, U256::from(0), 3, &onchain);

        assert_eq!(value, U256::from(3_000_000_000_000_000u64));
        assert_eq!(call.currency, drop_types::NATIVE_TOKEN);
        assert!(call.allowlistProof.proof.is_empty());
    }

    #[test]
    fn test_missing_or_malformed_proof_claims_with_empty_proof() {
        let condition = gated(drop_types::USDC_BASE);

        for lookup in [
            Ok(None),
            Err(ProofError::MalformedAddress("Invalid address".into())),
        ] {
            let onchain =
                claim_proof_from(CLAIMER, &condition, lookup, Address::repeat_byte(0x99)).unwrap();
            assert!(onchain.proof.is_empty());
            assert_eq!(onchain.max_quantity_in_proof, U256::ZERO);
            assert_eq!(onchain.price_per_token, condition.price_per_token);
            assert_eq!(onchain.currency, drop_types::USDC_BASE);
        }
    }

    #[test]
    fn test_zero_currency_falls_back() {
        let condition = gated(Address::ZERO);
        let fallback = Address::repeat_byte(0x99);

        let onchain = claim_proof_from(CLAIMER, &condition, Ok(None), fallback).unwrap();
        assert_eq!(onchain.currency, fallback);

        let proof = ProofData {
            proof: vec![B256::repeat_byte(0x01)],
            ..ProofData::default()
        };
        let onchain = claim_proof_from(CLAIMER, &condition, Ok(Some(proof)), fallback).unwrap();
        assert_eq!(onchain.currency, fallback);
        assert_eq!(onchain.max_quantity_in_proof, U256::from(1));

        let (_, value) = build_claim(CLAIMER, U256::from(0), 1, &onchain);
        assert_eq!(value, U256::ZERO);
    }

    #[test]
    fn test_proof_service_failure_aborts_claim() {
        let condition = gated(drop_types::USDC_BASE);

        let err = claim_proof_from(
            CLAIMER,
            &condition,
            Err(ProofError::Service("HTTP 503".into())),
            drop_types::USDC_BASE,
        )
        .unwrap_err();

        assert!(matches!(err, crate::Error::ProofService(_)), "{err}");
    }
}
