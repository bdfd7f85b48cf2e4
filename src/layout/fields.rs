//! Raw accessors for fixed-width fields in mapped memory
//!
//! All functions take pointers that the caller has bounds-checked against
//! the mapping; other processes may be writing the same bytes concurrently,
//! so nothing here hands out references into the segment.

use std::ptr;

/// Copy a null-terminated field out of the segment
pub(crate) unsafe fn read_cstr(field: *const u8, capacity: usize) -> Vec<u8> {
    let mut buf = vec![0u8; capacity];
    ptr::copy_nonoverlapping(field, buf.as_mut_ptr(), capacity);
    let len = buf.iter().position(|&b| b == 0).unwrap_or(capacity);
    buf.truncate(len);
    buf
}

/// Compare a null-terminated field against `expected` without copying it
pub(crate) unsafe fn cstr_equals(field: *const u8, capacity: usize, expected: &[u8]) -> bool {
    if expected.len() >= capacity {
        return false;
    }
    for (i, &byte) in expected.iter().enumerate() {
        if ptr::read_volatile(field.add(i)) != byte {
            return false;
        }
    }
    ptr::read_volatile(field.add(expected.len())) == 0
}

pub(crate) unsafe fn cstr_is_empty(field: *const u8) -> bool {
    ptr::read_volatile(field) == 0
}

/// Store `bytes` plus a terminator, cutting at `capacity - 1`.
/// Returns the number of bytes stored.
pub(crate) unsafe fn write_cstr(field: *mut u8, capacity: usize, bytes: &[u8]) -> usize {
    let len = bytes.len().min(capacity.saturating_sub(1));
    ptr::copy_nonoverlapping(bytes.as_ptr(), field, len);
    ptr::write_volatile(field.add(len), 0);
    len
}

pub(crate) unsafe fn read_u32(field: *const u8) -> u32 {
    let mut raw = [0u8; 4];
    ptr::copy_nonoverlapping(field, raw.as_mut_ptr(), 4);
    u32::from_le_bytes(raw)
}

pub(crate) unsafe fn write_u32(field: *mut u8, value: u32) {
    let raw = value.to_le_bytes();
    ptr::copy_nonoverlapping(raw.as_ptr(), field, 4);
}
