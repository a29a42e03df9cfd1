//! Solidity ABI surface of the contracts this engine talks to.
//!
//! The operation set is closed, so each call is a typed `sol!` binding rather than a runtime ABI.

use alloy_sol_types::sol;

sol! {
    /// Billing contract: publishes dues and collects from unpaid accounts.
    interface IBilling {
        function bill(address[] ids, uint256[] due, uint256 newPrice) external;
        function draft(address id, uint256 amt) external;
        function fine(address id, uint256 amt, address to) external;
    }

    /// Zodiac Roles modifier: forwards a call for a delegate signer scoped by `roleKey`.
    interface IRoles {
        function execTransactionWithRole(
            address to,
            uint256 value,
            bytes data,
            uint8 operation,
            bytes32 roleKey,
            bool shouldRevert
        ) external returns (bool success);
    }
}
