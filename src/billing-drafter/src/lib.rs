//! Batched settlement engine for the billing contract.
//!
//! Unpaid accounts are drafted and fined in a single atomic submission routed through a Zodiac
//! Roles modifier, so the automation key can only ever perform the pre-authorised calls.

pub mod abi;
pub mod batch;
pub mod billing;
pub mod builders;
pub mod constants;
pub mod errors;
pub mod executor;
pub mod fine;
pub mod gas;
pub mod ledger;
pub mod settlement;
pub mod utils;

pub use billing_drafter_types as types;

pub use errors::{EncodingError, LedgerError, SettlementError};
pub use executor::DelegatedExecutor;
pub use ledger::{EthersLedger, Ledger, LedgerCall, SubmissionReceipt};
pub use settlement::{Settlement, SettlementConfig, SettlementOutcome, SkipReason};
