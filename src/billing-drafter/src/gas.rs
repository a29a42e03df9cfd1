//! Fee estimator: live fee-market data plus a gas estimate for the exact submission path.

use billing_drafter_types::FeeEstimate;
use tracing::debug;

use crate::{
    errors::{Result, SettlementError},
    ledger::{Ledger, LedgerCall},
};

/// Estimate what sending `call` would cost right now.
///
/// `call` must be the permission-gate call that will actually be submitted, not the inner
/// target call. Missing fee fields abort with [`SettlementError::FeeDataUnavailable`]; no default
/// price is ever substituted.
pub async fn estimate<L: Ledger + ?Sized>(ledger: &L, call: &LedgerCall) -> Result<FeeEstimate> {
    let unavailable = |what: &str, err: crate::errors::LedgerError| {
        SettlementError::FeeDataUnavailable(format!("{what}: {err}"))
    };

    let (params, block, gas_units) = tokio::try_join!(
        async {
            ledger
                .fee_parameters()
                .await
                .map_err(|e| unavailable("fee parameters", e))
        },
        async {
            ledger
                .latest_block()
                .await
                .map_err(|e| unavailable("latest block", e))
        },
        async {
            ledger
                .estimate_gas(call)
                .await
                .map_err(|e| unavailable("gas estimate", e))
        },
    )?;

    let (Some(max_fee_per_gas), Some(priority_fee_per_gas)) =
        (params.max_fee_per_gas, params.max_priority_fee_per_gas)
    else {
        return Err(SettlementError::FeeDataUnavailable(
            "no gas fee data".to_string(),
        ));
    };
    let base_fee_per_gas = block.base_fee_per_gas.ok_or_else(|| {
        SettlementError::FeeDataUnavailable(format!("no base fee in block {}", block.number))
    })?;

    let estimate = FeeEstimate {
        gas_units,
        max_fee_per_gas,
        priority_fee_per_gas,
        base_fee_per_gas,
    };
    debug!(
        gas_units = %estimate.gas_units,
        effective_gas_price = %estimate.effective_gas_price(),
        block = block.number,
        "fee estimate"
    );
    Ok(estimate)
}
