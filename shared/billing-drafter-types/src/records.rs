use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Externally derived payment status for the current period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Overpaid,
}

/// One row of the payment-status query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRecord {
    pub account: Address,
    pub billed_amount: U256,
    pub paid_amount: U256,
    pub status: PaymentStatus,
}

impl PaymentStatusRecord {
    /// Outstanding amount for an UNPAID record.
    ///
    /// `None` when the record is not UNPAID or when nothing is actually owed; the latter is an
    /// inconsistency in the upstream data and must be reported by the caller.
    pub fn owing(&self) -> Option<U256> {
        if self.status != PaymentStatus::Unpaid {
            return None;
        }
        self.billed_amount
            .checked_sub(self.paid_amount)
            .filter(|owing| !owing.is_zero())
    }
}

/// Amount due from one billing address for the period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountDue {
    pub billing_address: Address,
    pub due_amount_wei: U256,
}

/// Output of the billing query: per-address dues plus the new period fee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingData {
    pub due_amounts: Vec<AmountDue>,
    pub period_fee: U256,
}
