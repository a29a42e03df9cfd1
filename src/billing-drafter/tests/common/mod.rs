//! In-memory ledger used by the integration tests.
//!
//! Submissions are decoded exactly as the Roles modifier and batch relay would execute them;
//! effects are only committed when the whole submission succeeds.

#![allow(dead_code)]

use std::{sync::Mutex, time::Duration};

use alloy_primitives::{Address, FixedBytes, B256, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use billing_drafter::{
    abi::IRoles,
    batch::decode_batch,
    builders::{decode_call, LedgerOperation},
    types::{FeeParameters, Operation, RoleDelegation},
    ledger::LatestBlock,
    Ledger, LedgerCall, LedgerError, SubmissionReceipt,
};

pub fn account(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn billing_contract() -> Address {
    Address::repeat_byte(0xbb)
}

pub fn fine_recipient() -> Address {
    Address::repeat_byte(0xfe)
}

pub fn role() -> RoleDelegation {
    RoleDelegation {
        executor: Address::repeat_byte(0xee),
        role_key: FixedBytes::repeat_byte(0x01),
    }
}

#[derive(Default)]
pub struct Calls {
    pub fee_parameters: usize,
    pub latest_block: usize,
    pub estimates: Vec<LedgerCall>,
    pub submissions: Vec<LedgerCall>,
    /// Operations applied by successful submissions, in execution order.
    pub committed: Vec<LedgerOperation>,
}

pub struct MockLedger {
    pub fees: FeeParameters,
    pub base_fee: Option<U256>,
    pub gas_units: U256,
    pub revert_reason: Option<String>,
    pub submit_delay: Option<Duration>,
    pub calls: Mutex<Calls>,
}

impl MockLedger {
    /// Fees such that the effective gas price is `price` (`base = price`, no tip).
    pub fn with_cost(gas_units: u64, price: u64) -> Self {
        Self {
            fees: FeeParameters {
                max_fee_per_gas: Some(U256::from(price * 10 + 1)),
                max_priority_fee_per_gas: Some(U256::ZERO),
            },
            base_fee: Some(U256::from(price)),
            gas_units: U256::from(gas_units),
            revert_reason: None,
            submit_delay: None,
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn reverting(mut self, reason: &str) -> Self {
        self.revert_reason = Some(reason.to_string());
        self
    }

    pub fn estimates(&self) -> usize {
        self.calls.lock().unwrap().estimates.len()
    }

    pub fn submissions(&self) -> usize {
        self.calls.lock().unwrap().submissions.len()
    }

    pub fn committed(&self) -> Vec<LedgerOperation> {
        self.calls.lock().unwrap().committed.clone()
    }

    /// Unwrap a submission the way the chain would execute it.
    fn execute(&self, call: &LedgerCall) -> Result<Vec<LedgerOperation>, LedgerError> {
        let decode = |data: &[u8]| {
            decode_call(data).map_err(|e| LedgerError::Reverted(Some(e.to_string())))
        };
        if call.to != role().executor {
            return Ok(vec![decode(&call.data)?]);
        }

        let exec = IRoles::execTransactionWithRoleCall::abi_decode(&call.data, true)
            .map_err(|e| LedgerError::Reverted(Some(e.to_string())))?;
        assert!(exec.shouldRevert, "role executions must require success");
        assert_eq!(exec.roleKey, role().role_key);

        if exec.operation == u8::from(Operation::DelegateCall) {
            decode_batch(&exec.data)
                .map_err(|e| LedgerError::Reverted(Some(e.to_string())))?
                .iter()
                .map(|tx| decode(&tx.data))
                .collect()
        } else {
            Ok(vec![decode(&exec.data)?])
        }
    }
}

#[async_trait]
impl Ledger for MockLedger {
    fn signer(&self) -> Address {
        Address::repeat_byte(0x5e)
    }

    async fn fee_parameters(&self) -> Result<FeeParameters, LedgerError> {
        self.calls.lock().unwrap().fee_parameters += 1;
        Ok(self.fees)
    }

    async fn latest_block(&self) -> Result<LatestBlock, LedgerError> {
        self.calls.lock().unwrap().latest_block += 1;
        Ok(LatestBlock {
            number: 100,
            base_fee_per_gas: self.base_fee,
        })
    }

    async fn estimate_gas(&self, call: &LedgerCall) -> Result<U256, LedgerError> {
        self.calls.lock().unwrap().estimates.push(call.clone());
        Ok(self.gas_units)
    }

    async fn submit(&self, call: &LedgerCall) -> Result<SubmissionReceipt, LedgerError> {
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        let mut calls = self.calls.lock().unwrap();
        calls.submissions.push(call.clone());
        if let Some(reason) = &self.revert_reason {
            return Err(LedgerError::Reverted(Some(reason.clone())));
        }
        let ops = self.execute(call)?;
        calls.committed.extend(ops);
        Ok(SubmissionReceipt {
            transaction_hash: B256::repeat_byte(calls.submissions.len() as u8),
            block_number: Some(101),
            gas_used: Some(self.gas_units),
        })
    }
}
