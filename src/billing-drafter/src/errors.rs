use alloy_primitives::Address;
use thiserror::Error;

/// Errors during batch/call-data encoding and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("cannot encode an empty batch")]
    EmptyInput,
    #[error("unknown call kind byte {0:#04x}")]
    UnknownOperation(u8),
    #[error("call-data of {0} bytes exceeds the record length prefix")]
    CallDataTooLong(usize),
    #[error("truncated batch record")]
    Truncated,
    #[error("unrecognised call-data: {0}")]
    UnknownCall(String),
}

/// Errors raised by a ledger client.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger transport error: {0}")]
    Transport(String),
    #[error("call reverted{}", .0.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    Reverted(Option<String>),
    #[error("submission dropped from the mempool")]
    Dropped,
}

/// Errors during a settlement or billing run.
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("fee data unavailable: {0}")]
    FeeDataUnavailable(String),

    #[error("no role delegation configured")]
    NoRoleConfigured,

    #[error("submission reverted{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    SubmissionReverted { reason: Option<String> },

    #[error("empty batch")]
    EmptyBatch,

    #[error("record for {account} is UNPAID but nothing is owed")]
    InconsistentRecord { account: Address },

    #[error("invalid billing data: {0}")]
    InvalidBillingData(String),

    #[error("another run is already in flight")]
    RunInProgress,

    #[error("arithmetic overflow computing {0}")]
    ArithmeticOverflow(&'static str),

    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for SettlementError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Reverted(reason) => SettlementError::SubmissionReverted { reason },
            other => SettlementError::Ledger(other),
        }
    }
}

pub type Result<T, E = SettlementError> = std::result::Result<T, E>;
