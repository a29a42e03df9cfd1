use alloy_primitives::{Address, Bytes, FixedBytes, U256};

use crate::operation::Operation;

/// Unsigned description of one ledger call, prior to encoding/signing/submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaTransaction {
    /// Contract to invoke.
    pub to: Address,
    /// Native value attached to the call (zero for everything this system builds).
    pub value: U256,
    /// ABI call-data (selector + arguments).
    pub data: Bytes,
    /// `DelegateCall` only ever appears on the wrapper produced by the batch encoder.
    pub operation: Operation,
}

impl MetaTransaction {
    /// Plain zero-value `Call` to `to`.
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
            operation: Operation::Call,
        }
    }
}

/// Permission-gate configuration for the delegate signer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleDelegation {
    /// The permission-gate (Roles modifier) contract.
    pub executor: Address,
    /// Selects which permission policy applies to the delegate signer.
    pub role_key: FixedBytes<32>,
}

/// Who is allowed to submit draft/fine calls for this process.
///
/// `Unconfigured` never falls back to the raw signer: draft/fine runs are refused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionAuthority {
    #[default]
    Unconfigured,
    Delegated(RoleDelegation),
}

impl ExecutionAuthority {
    pub fn from_parts(executor: Option<Address>, role_key: Option<FixedBytes<32>>) -> Option<Self> {
        match (executor, role_key) {
            (Some(executor), Some(role_key)) => {
                Some(Self::Delegated(RoleDelegation { executor, role_key }))
            }
            (None, None) => Some(Self::Unconfigured),
            _ => None,
        }
    }

    pub fn delegation(&self) -> Option<&RoleDelegation> {
        match self {
            Self::Delegated(role) => Some(role),
            Self::Unconfigured => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_requires_both_parts() {
        let executor = Address::repeat_byte(0x11);
        let key = FixedBytes::repeat_byte(0x22);

        assert_eq!(
            ExecutionAuthority::from_parts(None, None),
            Some(ExecutionAuthority::Unconfigured)
        );
        assert_eq!(ExecutionAuthority::from_parts(Some(executor), None), None);
        assert_eq!(ExecutionAuthority::from_parts(None, Some(key)), None);

        let authority = ExecutionAuthority::from_parts(Some(executor), Some(key)).unwrap();
        assert_eq!(authority.delegation().unwrap().role_key, key);
    }

    #[test]
    fn test_call_defaults() {
        let tx = MetaTransaction::call(Address::ZERO, vec![0xab]);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.operation, Operation::Call);
        assert_eq!(&tx.data[..], &[0xabu8]);
    }
}
