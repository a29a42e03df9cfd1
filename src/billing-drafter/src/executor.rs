//! Delegated executor: submits calls through the Roles modifier with mandatory success.

use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use billing_drafter_types::{ExecutionAuthority, MetaTransaction, RoleDelegation};
use tracing::info;

use crate::{
    abi::IRoles,
    batch,
    errors::{Result, SettlementError},
    ledger::{Ledger, LedgerCall, SubmissionReceipt},
};

/// The forwarded call must succeed or the whole submission reverts. Not configurable.
const SHOULD_REVERT: bool = true;

/// Wrap `tx` in `execTransactionWithRole(to, value, data, operation, roleKey, true)`.
pub fn authorize(role: &RoleDelegation, tx: &MetaTransaction) -> LedgerCall {
    let call = IRoles::execTransactionWithRoleCall {
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        operation: tx.operation.into(),
        roleKey: role.role_key,
        shouldRevert: SHOULD_REVERT,
    };
    LedgerCall {
        to: role.executor,
        data: call.abi_encode().into(),
    }
}

/// Submits batches on behalf of the delegate signer.
#[derive(Clone, Copy, Debug, Default)]
pub struct DelegatedExecutor {
    authority: ExecutionAuthority,
    relay: Option<Address>,
}

impl DelegatedExecutor {
    pub fn new(authority: ExecutionAuthority) -> Self {
        Self {
            authority,
            relay: None,
        }
    }

    /// Use `relay` instead of the well-known batch relay.
    pub fn with_relay(mut self, relay: Address) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn authority(&self) -> &ExecutionAuthority {
        &self.authority
    }

    /// The exact permission-gate call [`DelegatedExecutor::execute`] would send for
    /// `transactions`.
    pub fn prepare(&self, transactions: &[MetaTransaction]) -> Result<LedgerCall> {
        let ExecutionAuthority::Delegated(role) = &self.authority else {
            return Err(SettlementError::NoRoleConfigured);
        };
        if transactions.is_empty() {
            return Err(SettlementError::EmptyBatch);
        }
        let batched = match self.relay {
            Some(relay) => batch::encode_with_relay(transactions, relay)?,
            None => batch::encode(transactions)?,
        };
        Ok(authorize(role, &batched))
    }

    /// Submit `transactions` as one atomic operation and wait for the receipt.
    ///
    /// A revert is surfaced as [`SettlementError::SubmissionReverted`] and never retried here.
    pub async fn execute<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        transactions: &[MetaTransaction],
    ) -> Result<SubmissionReceipt> {
        let call = self.prepare(transactions)?;
        info!(
            calls = transactions.len(),
            executor = %call.to,
            "submitting through role executor"
        );
        let receipt = ledger.submit(&call).await?;
        info!(tx_hash = %receipt.transaction_hash, "submission mined");
        Ok(receipt)
    }
}
