//! Penalty calculator.

use alloy_primitives::U256;
use billing_drafter_types::{FeeEstimate, MetaTransaction};
use tracing::debug;

use crate::{
    errors::{Result, SettlementError},
    executor::DelegatedExecutor,
    gas,
    ledger::Ledger,
};

/// Uniform per-account fine for a batch of `accounts` drafts costing `estimate`.
///
/// Each account incurs a draft and a fine, so the batch cost is doubled before being split
/// evenly. Integer division truncates; the result never drops below `min_fine`.
pub fn fine_for_cost(estimate: &FeeEstimate, accounts: usize, min_fine: U256) -> Result<U256> {
    if accounts == 0 {
        return Err(SettlementError::EmptyBatch);
    }
    let total_cost = estimate
        .total_cost()
        .ok_or(SettlementError::ArithmeticOverflow("total cost"))?;
    let per_account = total_cost
        .checked_mul(U256::from(2u8))
        .ok_or(SettlementError::ArithmeticOverflow("fine"))?
        / U256::from(accounts);
    Ok(per_account.max(min_fine))
}

/// Estimate the cost of executing `drafts` through `executor` and derive the fine from it.
pub async fn compute_fine<L: Ledger + ?Sized>(
    ledger: &L,
    executor: &DelegatedExecutor,
    drafts: &[MetaTransaction],
    min_fine: U256,
) -> Result<U256> {
    let candidate = executor.prepare(drafts)?;
    let estimate = gas::estimate(ledger, &candidate).await?;
    let fine = fine_for_cost(&estimate, drafts.len(), min_fine)?;
    debug!(accounts = drafts.len(), %fine, %min_fine, "computed fine");
    Ok(fine)
}
