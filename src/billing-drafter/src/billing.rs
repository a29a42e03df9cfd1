//! Period billing: publishes per-address dues and the new period fee in one `bill` call.
//!
//! Billing is not a privileged operation, so it is sent directly from the biller signer rather
//! than through the role executor.

use std::collections::HashSet;

use alloy_primitives::Address;
use billing_drafter_types::BillingData;
use tracing::info;

use crate::{
    builders::build_bill,
    errors::{Result, SettlementError},
    ledger::{Ledger, LedgerCall, SubmissionReceipt},
};

/// Reject billing data the contract should never see.
pub fn validate_billing_data(data: &BillingData) -> Result<()> {
    if data.due_amounts.is_empty() {
        return Err(SettlementError::InvalidBillingData(
            "no amounts due".to_string(),
        ));
    }
    let mut seen = HashSet::with_capacity(data.due_amounts.len());
    for due in &data.due_amounts {
        if due.billing_address == Address::ZERO {
            return Err(SettlementError::InvalidBillingData(
                "zero billing address".to_string(),
            ));
        }
        if !seen.insert(due.billing_address) {
            return Err(SettlementError::InvalidBillingData(format!(
                "duplicate billing address {}",
                due.billing_address
            )));
        }
    }
    Ok(())
}

/// Validate `data` and submit `bill(ids, due, periodFee)` to `contract`.
pub async fn submit_bill<L: Ledger + ?Sized>(
    ledger: &L,
    contract: Address,
    data: &BillingData,
) -> Result<SubmissionReceipt> {
    validate_billing_data(data)?;
    let tx = build_bill(contract, data);
    info!(
        accounts = data.due_amounts.len(),
        period_fee = %data.period_fee,
        %contract,
        "submitting bill"
    );
    let receipt = ledger
        .submit(&LedgerCall {
            to: tx.to,
            data: tx.data,
        })
        .await?;
    info!(tx_hash = %receipt.transaction_hash, "bill mined");
    Ok(receipt)
}
