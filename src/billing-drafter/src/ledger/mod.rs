//! Ledger client seam.
//!
//! Every component takes an explicit `&L: Ledger` handle; there is no ambient provider or signer.

pub mod rpc;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use billing_drafter_types::FeeParameters;

use crate::errors::LedgerError;

pub use self::rpc::EthersLedger;

/// A zero-value call from the configured signer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerCall {
    pub to: Address,
    pub data: Bytes,
}

/// Header fields of the most recent block that fee estimation needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LatestBlock {
    pub number: u64,
    pub base_fee_per_gas: Option<U256>,
}

/// Receipt of a mined, successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Address the client signs with.
    fn signer(&self) -> Address;

    async fn fee_parameters(&self) -> Result<FeeParameters, LedgerError>;

    async fn latest_block(&self) -> Result<LatestBlock, LedgerError>;

    /// Gas units `call` would consume if sent from [`Ledger::signer`].
    async fn estimate_gas(&self, call: &LedgerCall) -> Result<U256, LedgerError>;

    /// Sign, send and wait for `call` to be mined.
    ///
    /// A mined-but-failed transaction is reported as [`LedgerError::Reverted`].
    async fn submit(&self, call: &LedgerCall) -> Result<SubmissionReceipt, LedgerError>;
}
