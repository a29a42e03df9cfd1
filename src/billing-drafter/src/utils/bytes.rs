//! Minimal big-endian parsing helpers for batch records.

use alloy_primitives::{Address, U256};

use crate::errors::EncodingError;

pub fn read_u8(bytes: &[u8], i: &mut usize) -> Result<u8, EncodingError> {
    let b = *bytes.get(*i).ok_or(EncodingError::Truncated)?;
    *i += 1;
    Ok(b)
}

pub fn read_u32_be(bytes: &[u8], i: &mut usize) -> Result<u32, EncodingError> {
    if bytes.len() < *i + 4 {
        return Err(EncodingError::Truncated);
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*i..*i + 4]);
    *i += 4;
    Ok(u32::from_be_bytes(buf))
}

pub fn read_u256_be(bytes: &[u8], i: &mut usize) -> Result<U256, EncodingError> {
    if bytes.len() < *i + 32 {
        return Err(EncodingError::Truncated);
    }
    let out = U256::from_be_slice(&bytes[*i..*i + 32]);
    *i += 32;
    Ok(out)
}

pub fn read_address(bytes: &[u8], i: &mut usize) -> Result<Address, EncodingError> {
    if bytes.len() < *i + 20 {
        return Err(EncodingError::Truncated);
    }
    let addr = Address::from_slice(&bytes[*i..*i + 20]);
    *i += 20;
    Ok(addr)
}

pub fn read_vec(bytes: &[u8], i: &mut usize, len: usize) -> Result<Vec<u8>, EncodingError> {
    if bytes.len() < *i + len {
        return Err(EncodingError::Truncated);
    }
    let out = bytes[*i..*i + len].to_vec();
    *i += len;
    Ok(out)
}
