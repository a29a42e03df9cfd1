//! Shared types for ledger calls, payment records and fee data.

pub mod fees;
pub mod meta_tx;
pub mod operation;
pub mod records;

pub use fees::{FeeEstimate, FeeParameters};
pub use meta_tx::{ExecutionAuthority, MetaTransaction, RoleDelegation};
pub use operation::Operation;
pub use records::{AmountDue, BillingData, PaymentStatus, PaymentStatusRecord};
