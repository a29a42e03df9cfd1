//! Typed builders for billing-contract calls, and the matching call-data decoder.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{SolCall, SolInterface};
use billing_drafter_types::{BillingData, MetaTransaction};

use crate::{
    abi::IBilling::{self, IBillingCalls},
    errors::EncodingError,
};

/// A decoded billing-contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerOperation {
    Bill {
        ids: Vec<Address>,
        due: Vec<U256>,
        new_price: U256,
    },
    Draft {
        account: Address,
        amount: U256,
    },
    Fine {
        account: Address,
        amount: U256,
        recipient: Address,
    },
}

/// `draft(account, amount)` against the billing contract.
pub fn build_draft(contract: Address, account: Address, amount: U256) -> MetaTransaction {
    let call = IBilling::draftCall {
        id: account,
        amt: amount,
    };
    MetaTransaction::call(contract, call.abi_encode())
}

/// `fine(account, amount, recipient)` against the billing contract.
pub fn build_fine(
    contract: Address,
    account: Address,
    amount: U256,
    recipient: Address,
) -> MetaTransaction {
    let call = IBilling::fineCall {
        id: account,
        amt: amount,
        to: recipient,
    };
    MetaTransaction::call(contract, call.abi_encode())
}

/// `bill(ids, due, periodFee)`; the i-th id pairs with the i-th due amount.
pub fn build_bill(contract: Address, data: &BillingData) -> MetaTransaction {
    let (ids, due): (Vec<_>, Vec<_>) = data
        .due_amounts
        .iter()
        .map(|d| (d.billing_address, d.due_amount_wei))
        .unzip();
    let call = IBilling::billCall {
        ids,
        due,
        newPrice: data.period_fee,
    };
    MetaTransaction::call(contract, call.abi_encode())
}

/// Decode billing-contract call-data back into the operation that produced it.
pub fn decode_call(data: &[u8]) -> Result<LedgerOperation, EncodingError> {
    let call = IBillingCalls::abi_decode(data, true)
        .map_err(|err| EncodingError::UnknownCall(err.to_string()))?;
    let op = match call {
        IBillingCalls::bill(c) => LedgerOperation::Bill {
            ids: c.ids,
            due: c.due,
            new_price: c.newPrice,
        },
        IBillingCalls::draft(c) => LedgerOperation::Draft {
            account: c.id,
            amount: c.amt,
        },
        IBillingCalls::fine(c) => LedgerOperation::Fine {
            account: c.id,
            amount: c.amt,
            recipient: c.to,
        },
    };
    Ok(op)
}
