//! Settlement orchestrator.
//!
//! One run: classify payment records, draft every unpaid account, price a uniform fine from the
//! cost of the drafts, then submit `drafts ++ fines` as a single all-or-nothing operation.
//!
//! Runs are single-writer: the delegate signer's nonce ordering breaks if two submissions race,
//! so [`Settlement::run`] refuses to start while another run holds the lock. Parallel runs are
//! unsafe and must also be prevented across processes by the caller.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use billing_drafter_types::{
    BillingData, ExecutionAuthority, MetaTransaction, PaymentStatus, PaymentStatusRecord,
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    billing::submit_bill,
    builders::{build_draft, build_fine},
    errors::{Result, SettlementError},
    executor::DelegatedExecutor,
    fine::compute_fine,
    ledger::{Ledger, SubmissionReceipt},
};

/// Static inputs of the orchestrator, fixed for the process lifetime.
#[derive(Clone, Debug)]
pub struct SettlementConfig {
    pub billing_contract: Address,
    pub fine_recipient: Address,
    pub min_fine: U256,
    pub authority: ExecutionAuthority,
    /// Overrides the well-known batch relay.
    pub batch_relay: Option<Address>,
}

/// An unpaid account selected for drafting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnpaidAccount {
    pub account: Address,
    pub owing: U256,
}

/// Every input record lands in exactly one bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub unpaid: Vec<UnpaidAccount>,
    pub overpaid: Vec<PaymentStatusRecord>,
    pub paid: Vec<PaymentStatusRecord>,
}

impl Classification {
    pub fn len(&self) -> usize {
        self.unpaid.len() + self.overpaid.len() + self.paid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `records` by status, preserving input order within each bucket.
///
/// An UNPAID record that owes nothing is an upstream inconsistency and fails the whole run.
pub fn classify(records: &[PaymentStatusRecord]) -> Result<Classification> {
    let mut out = Classification::default();
    for record in records {
        match record.status {
            PaymentStatus::Paid => out.paid.push(record.clone()),
            PaymentStatus::Overpaid => out.overpaid.push(record.clone()),
            PaymentStatus::Unpaid => {
                let owing = record.owing().ok_or(SettlementError::InconsistentRecord {
                    account: record.account,
                })?;
                out.unpaid.push(UnpaidAccount {
                    account: record.account,
                    owing,
                });
            }
        }
    }
    Ok(out)
}

/// Ordered calls for one run: every draft, then every fine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementBatch {
    pub drafts: Vec<MetaTransaction>,
    pub fines: Vec<MetaTransaction>,
}

impl SettlementBatch {
    pub fn into_calls(self) -> Vec<MetaTransaction> {
        let mut calls = self.drafts;
        calls.extend(self.fines);
        calls
    }
}

/// Why a run did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No unpaid accounts.
    Empty,
    /// Unpaid accounts exist but no role delegation is configured.
    Unauthorized,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => f.write_str("empty"),
            SkipReason::Unauthorized => f.write_str("unauthorized"),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum SettlementOutcome {
    Succeeded {
        accounts: Vec<Address>,
        receipt: SubmissionReceipt,
    },
    Skipped(SkipReason),
    Failed(SettlementError),
}

impl SettlementOutcome {
    pub fn receipt_id(&self) -> Option<B256> {
        match self {
            SettlementOutcome::Succeeded { receipt, .. } => Some(receipt.transaction_hash),
            _ => None,
        }
    }
}

/// Run states, logged on every transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Classifying,
    Estimating,
    Submitting,
    Succeeded,
    Skipped,
    Failed,
}

/// Drives settlement runs against one ledger client.
pub struct Settlement<L> {
    ledger: L,
    config: SettlementConfig,
    executor: DelegatedExecutor,
    run_lock: Mutex<()>,
}

impl<L: Ledger> Settlement<L> {
    pub fn new(ledger: L, config: SettlementConfig) -> Self {
        let mut executor = DelegatedExecutor::new(config.authority);
        if let Some(relay) = config.batch_relay {
            executor = executor.with_relay(relay);
        }
        Self {
            ledger,
            config,
            executor,
            run_lock: Mutex::new(()),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Build the drafts for `unpaid`, price the fine once, and append one fine per account.
    pub async fn build_batch(&self, unpaid: &[UnpaidAccount]) -> Result<SettlementBatch> {
        let contract = self.config.billing_contract;
        let drafts: Vec<_> = unpaid
            .iter()
            .map(|u| build_draft(contract, u.account, u.owing))
            .collect();

        let fine = compute_fine(&self.ledger, &self.executor, &drafts, self.config.min_fine).await?;
        let fines = unpaid
            .iter()
            .map(|u| build_fine(contract, u.account, fine, self.config.fine_recipient))
            .collect();

        Ok(SettlementBatch { drafts, fines })
    }

    /// Execute one settlement run over `records`.
    ///
    /// Never retries: a failed run must be re-started from fresh records.
    pub async fn run(&self, records: &[PaymentStatusRecord]) -> SettlementOutcome {
        let Ok(_guard) = self.run_lock.try_lock() else {
            error!("settlement run refused: another run is in flight");
            return SettlementOutcome::Failed(SettlementError::RunInProgress);
        };

        let outcome = match self.run_locked(records).await {
            Ok(outcome) => outcome,
            Err(err) => SettlementOutcome::Failed(err),
        };

        match &outcome {
            SettlementOutcome::Succeeded { accounts, receipt } => {
                transition(RunState::Succeeded);
                info!(
                    accounts = accounts.len(),
                    tx_hash = %receipt.transaction_hash,
                    "settlement succeeded"
                );
            }
            SettlementOutcome::Skipped(reason) => {
                transition(RunState::Skipped);
                match reason {
                    SkipReason::Empty => info!("settlement skipped: no unpaid accounts"),
                    SkipReason::Unauthorized => {
                        warn!("settlement skipped: unpaid accounts exist but no role delegation is configured")
                    }
                }
            }
            SettlementOutcome::Failed(err) => {
                transition(RunState::Failed);
                error!(error = %err, "settlement failed");
            }
        }
        outcome
    }

    /// Publish the period bill, holding the same single-writer lock as settlement runs.
    pub async fn bill(&self, data: &BillingData) -> Result<SubmissionReceipt> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| SettlementError::RunInProgress)?;
        submit_bill(&self.ledger, self.config.billing_contract, data).await
    }

    async fn run_locked(&self, records: &[PaymentStatusRecord]) -> Result<SettlementOutcome> {
        transition(RunState::Idle);
        transition(RunState::Classifying);
        let classified = classify(records)?;
        for record in &classified.overpaid {
            info!(
                account = %record.account,
                billed = %record.billed_amount,
                paid = %record.paid_amount,
                "overpaid account observed"
            );
        }
        info!(
            unpaid = classified.unpaid.len(),
            overpaid = classified.overpaid.len(),
            paid = classified.paid.len(),
            "classified payment records"
        );

        if classified.unpaid.is_empty() {
            return Ok(SettlementOutcome::Skipped(SkipReason::Empty));
        }
        if let ExecutionAuthority::Unconfigured = self.executor.authority() {
            return Ok(SettlementOutcome::Skipped(SkipReason::Unauthorized));
        }

        transition(RunState::Estimating);
        let batch = self.build_batch(&classified.unpaid).await?;

        transition(RunState::Submitting);
        let receipt = self
            .executor
            .execute(&self.ledger, &batch.into_calls())
            .await?;

        Ok(SettlementOutcome::Succeeded {
            accounts: classified.unpaid.into_iter().map(|u| u.account).collect(),
            receipt,
        })
    }
}

fn transition(state: RunState) {
    info!(?state, "settlement state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(byte: u8, billed: u64, paid: u64, status: PaymentStatus) -> PaymentStatusRecord {
        PaymentStatusRecord {
            account: Address::repeat_byte(byte),
            billed_amount: U256::from(billed),
            paid_amount: U256::from(paid),
            status,
        }
    }

    #[test]
    fn test_classification_is_complete() {
        let records = vec![
            record(1, 100, 40, PaymentStatus::Unpaid),
            record(2, 100, 100, PaymentStatus::Paid),
            record(3, 100, 150, PaymentStatus::Overpaid),
            record(4, 50, 0, PaymentStatus::Unpaid),
            record(5, 10, 10, PaymentStatus::Paid),
        ];
        let classified = classify(&records).unwrap();

        assert_eq!(classified.len(), records.len());
        assert_eq!(
            classified.unpaid,
            vec![
                UnpaidAccount {
                    account: Address::repeat_byte(1),
                    owing: U256::from(60u64)
                },
                UnpaidAccount {
                    account: Address::repeat_byte(4),
                    owing: U256::from(50u64)
                },
            ]
        );
        assert_eq!(classified.overpaid, vec![records[2].clone()]);
        assert_eq!(classified.paid, vec![records[1].clone(), records[4].clone()]);
    }

    fn consistent_record() -> impl Strategy<Value = PaymentStatusRecord> {
        (any::<u8>(), 1..u64::MAX, any::<u64>(), 0u8..3).prop_map(|(byte, billed, paid, status)| {
            match status {
                0 => record(byte, billed, paid % billed, PaymentStatus::Unpaid),
                1 => record(byte, billed, billed, PaymentStatus::Paid),
                _ => record(byte, billed, paid, PaymentStatus::Overpaid),
            }
        })
    }

    proptest! {
        #[test]
        fn test_every_record_classified_once(records in prop::collection::vec(consistent_record(), 0..64)) {
            let classified = classify(&records).unwrap();

            prop_assert_eq!(classified.len(), records.len());
            let unpaid = records.iter().filter(|r| r.status == PaymentStatus::Unpaid).count();
            prop_assert_eq!(classified.unpaid.len(), unpaid);
            for (u, r) in classified
                .unpaid
                .iter()
                .zip(records.iter().filter(|r| r.status == PaymentStatus::Unpaid))
            {
                prop_assert_eq!(u.account, r.account);
                prop_assert_eq!(u.owing, r.billed_amount - r.paid_amount);
            }
        }
    }

    #[test]
    fn test_inconsistent_unpaid_record_reported() {
        let records = vec![record(7, 100, 100, PaymentStatus::Unpaid)];
        match classify(&records) {
            Err(SettlementError::InconsistentRecord { account }) => {
                assert_eq!(account, Address::repeat_byte(7))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_batch_orders_drafts_before_fines() {
        let draft = MetaTransaction::call(Address::ZERO, vec![1u8]);
        let fine = MetaTransaction::call(Address::ZERO, vec![2u8]);
        let batch = SettlementBatch {
            drafts: vec![draft.clone(), draft.clone()],
            fines: vec![fine.clone(), fine.clone()],
        };
        assert_eq!(batch.into_calls(), vec![draft.clone(), draft, fine.clone(), fine]);
    }
}
