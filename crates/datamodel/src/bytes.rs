//! Bounds-checked big-endian reads over encoded payloads.

use tessera_types::{Result, SystemError};

pub(crate) fn slice(bytes: &[u8], at: usize, len: usize) -> Result<&[u8]> {
    at.checked_add(len)
        .and_then(|end| bytes.get(at..end))
        .ok_or_else(|| {
            SystemError::internal(format!(
                "read of {len} bytes at offset {at} exceeds payload of {} bytes",
                bytes.len()
            ))
        })
}

fn array<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    buf.copy_from_slice(slice(bytes, at, N)?);
    Ok(buf)
}

pub(crate) fn read_u8(bytes: &[u8], at: usize) -> Result<u8> {
    Ok(array::<1>(bytes, at)?[0])
}

pub(crate) fn read_i8(bytes: &[u8], at: usize) -> Result<i8> {
    Ok(i8::from_be_bytes(array(bytes, at)?))
}

pub(crate) fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    Ok(u16::from_be_bytes(array(bytes, at)?))
}

pub(crate) fn read_i16(bytes: &[u8], at: usize) -> Result<i16> {
    Ok(i16::from_be_bytes(array(bytes, at)?))
}

pub(crate) fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    Ok(u32::from_be_bytes(array(bytes, at)?))
}

pub(crate) fn read_i32(bytes: &[u8], at: usize) -> Result<i32> {
    Ok(i32::from_be_bytes(array(bytes, at)?))
}

pub(crate) fn read_i64(bytes: &[u8], at: usize) -> Result<i64> {
    Ok(i64::from_be_bytes(array(bytes, at)?))
}

/// Reads a u16 length prefix and the bytes it covers, returning them and the
/// offset just past them.
pub(crate) fn read_length_prefixed(bytes: &[u8], at: usize) -> Result<(&[u8], usize)> {
    let len = read_u16(bytes, at)? as usize;
    let body = slice(bytes, at + 2, len)?;
    Ok((body, at + 2 + len))
}
