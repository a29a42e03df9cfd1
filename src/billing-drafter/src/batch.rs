//! Batch encoder: packs ordered calls into one atomic relay call, and the inverse decoder.

use alloy_primitives::{Address, U256};
use billing_drafter_types::{MetaTransaction, Operation};

use crate::{
    constants::{MULTISEND, MULTISEND_CALL_ONLY, RECORD_HEADER_LEN},
    errors::EncodingError,
    utils::bytes::{read_address, read_u256_be, read_u32_be, read_u8, read_vec},
};

/// Pick the well-known relay for `transactions`: the full relay only when an inner call is a
/// `DelegateCall`.
pub fn default_relay(transactions: &[MetaTransaction]) -> Address {
    if transactions
        .iter()
        .any(|t| t.operation == Operation::DelegateCall)
    {
        MULTISEND
    } else {
        MULTISEND_CALL_ONLY
    }
}

/// Length prefix of a record; call-data past `u32::MAX` bytes cannot be framed.
fn record_data_len(len: usize) -> Result<u32, EncodingError> {
    u32::try_from(len).map_err(|_| EncodingError::CallDataTooLong(len))
}

/// Encode one call as a fixed record: kind || to || value || u32 data_len || data.
pub fn encode_record(tx: &MetaTransaction, buf: &mut Vec<u8>) -> Result<(), EncodingError> {
    let len = record_data_len(tx.data.len())?;
    buf.push(u8::from(tx.operation));
    buf.extend_from_slice(tx.to.as_slice());
    buf.extend_from_slice(&tx.value.to_be_bytes::<32>());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&tx.data);
    Ok(())
}

/// Encode `transactions` into a single call, using the default relay.
pub fn encode(transactions: &[MetaTransaction]) -> Result<MetaTransaction, EncodingError> {
    encode_with_relay(transactions, default_relay(transactions))
}

/// Encode `transactions` into a single call to `relay`.
///
/// One transaction is returned unchanged; several become one `DelegateCall` to the relay whose
/// data is the concatenation of their records, in input order.
pub fn encode_with_relay(
    transactions: &[MetaTransaction],
    relay: Address,
) -> Result<MetaTransaction, EncodingError> {
    match transactions {
        [] => Err(EncodingError::EmptyInput),
        [single] => Ok(single.clone()),
        many => {
            let capacity = many
                .iter()
                .map(|t| RECORD_HEADER_LEN + t.data.len())
                .sum();
            let mut data = Vec::with_capacity(capacity);
            for tx in many {
                encode_record(tx, &mut data)?;
            }
            Ok(MetaTransaction {
                to: relay,
                value: U256::ZERO,
                data: data.into(),
                operation: Operation::DelegateCall,
            })
        }
    }
}

/// Decode the record starting at `*i`, advancing the cursor past it.
pub fn decode_record(bytes: &[u8], i: &mut usize) -> Result<MetaTransaction, EncodingError> {
    let kind = read_u8(bytes, i)?;
    let operation = Operation::try_from(kind).map_err(EncodingError::UnknownOperation)?;
    let to = read_address(bytes, i)?;
    let value = read_u256_be(bytes, i)?;
    let len = read_u32_be(bytes, i)? as usize;
    let data = read_vec(bytes, i, len)?;
    Ok(MetaTransaction {
        to,
        value,
        data: data.into(),
        operation,
    })
}

/// Decode a batch payload back into its ordered calls.
pub fn decode_batch(bytes: &[u8]) -> Result<Vec<MetaTransaction>, EncodingError> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        out.push(decode_record(bytes, &mut i)?);
    }
    Ok(out)
}
