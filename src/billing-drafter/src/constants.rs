//! Well-known batch relay deployments (Safe MultiSend v1.4.1).
//!
//! Payloads built by [`crate::batch`] are the bare concatenation of fixed records with a 4-byte
//! length prefix. Stock MultiSend expects `multiSend(bytes)` with 32-byte lengths and reverts on
//! that payload, so these defaults only work where the deployment at the address accepts the
//! record format. Production runs should pass a compatible relay via `SettlementConfig::batch_relay`.

use alloy_primitives::{address, Address};

/// Relay that accepts inner `DelegateCall`s.
pub const MULTISEND: Address = address!("38869bf66a61cF6bDB996A6aE40D5853Fd43B526");

/// Relay restricted to inner `Call`s.
pub const MULTISEND_CALL_ONLY: Address = address!("9641d764fc13c8B624c04430C7356C1C7C8102e2");

// Fixed record layout: kind (1) || to (20) || value (32) || data_len (4) || data.
pub const RECORD_HEADER_LEN: usize = 1 + 20 + 32 + 4;
