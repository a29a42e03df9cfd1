//! JSON-RPC ledger client backed by `ethers`.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use billing_drafter_types::FeeParameters;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, MiddlewareError, Provider},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, BlockNumber, Bytes as EthBytes,
        Eip1559TransactionRequest, H160, U256 as EthU256,
    },
};
use tracing::debug;

use super::{LatestBlock, Ledger, LedgerCall, SubmissionReceipt};
use crate::errors::LedgerError;

type Client = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Ledger client signing with a local key over HTTP JSON-RPC.
pub struct EthersLedger {
    client: Arc<Client>,
    confirmations: usize,
}

impl EthersLedger {
    /// Connect to `rpc_url` and bind `wallet` to the node's chain id.
    pub async fn connect(rpc_url: &str, wallet: LocalWallet) -> Result<Self, LedgerError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|err| LedgerError::Transport(format!("invalid RPC url {rpc_url}: {err}")))?;
        let chain_id = provider.get_chainid().await.map_err(classify)?;
        let wallet = wallet.with_chain_id(chain_id.as_u64());
        debug!(chain_id = chain_id.as_u64(), signer = ?wallet.address(), "connected to ledger");

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            confirmations: 1,
        })
    }

    /// Number of blocks to wait for before a submission counts as mined.
    pub fn with_confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations;
        self
    }

    fn request(&self, call: &LedgerCall) -> TypedTransaction {
        Eip1559TransactionRequest::new()
            .from(self.client.address())
            .to(to_eth_address(call.to))
            .data(EthBytes::from(call.data.to_vec()))
            .into()
    }
}

#[async_trait]
impl Ledger for EthersLedger {
    fn signer(&self) -> Address {
        from_eth_address(self.client.address())
    }

    async fn fee_parameters(&self) -> Result<FeeParameters, LedgerError> {
        let (max_fee, priority_fee) = self
            .client
            .estimate_eip1559_fees(None)
            .await
            .map_err(classify)?;
        Ok(FeeParameters {
            max_fee_per_gas: Some(from_eth_u256(max_fee)),
            max_priority_fee_per_gas: Some(from_eth_u256(priority_fee)),
        })
    }

    async fn latest_block(&self) -> Result<LatestBlock, LedgerError> {
        let block = self
            .client
            .get_block(BlockNumber::Latest)
            .await
            .map_err(classify)?
            .ok_or_else(|| LedgerError::Transport("latest block not found".to_string()))?;
        Ok(LatestBlock {
            number: block.number.map(|n| n.as_u64()).unwrap_or_default(),
            base_fee_per_gas: block.base_fee_per_gas.map(from_eth_u256),
        })
    }

    async fn estimate_gas(&self, call: &LedgerCall) -> Result<U256, LedgerError> {
        let gas = self
            .client
            .estimate_gas(&self.request(call), None)
            .await
            .map_err(classify)?;
        Ok(from_eth_u256(gas))
    }

    async fn submit(&self, call: &LedgerCall) -> Result<SubmissionReceipt, LedgerError> {
        let pending = self
            .client
            .send_transaction(self.request(call), None)
            .await
            .map_err(classify)?;
        debug!(tx_hash = ?*pending, "submission accepted, awaiting receipt");

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(classify)?
            .ok_or(LedgerError::Dropped)?;

        let transaction_hash = B256::from_slice(receipt.transaction_hash.as_bytes());
        if receipt.status.map(|s| s.as_u64()) == Some(0) {
            return Err(LedgerError::Reverted(Some(format!(
                "transaction {transaction_hash} failed on-chain"
            ))));
        }

        Ok(SubmissionReceipt {
            transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used.map(from_eth_u256),
        })
    }
}

/// Split node-reported reverts from transport failures.
fn classify<E: MiddlewareError>(err: E) -> LedgerError {
    match err.as_error_response() {
        Some(rpc) if rpc.message.contains("revert") => LedgerError::Reverted(Some(rpc.message.clone())),
        _ => LedgerError::Transport(err.to_string()),
    }
}

fn to_eth_address(address: Address) -> H160 {
    H160::from_slice(address.as_slice())
}

fn from_eth_address(address: H160) -> Address {
    Address::from_slice(address.as_bytes())
}

fn from_eth_u256(value: EthU256) -> U256 {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    U256::from_be_bytes(buf)
}
