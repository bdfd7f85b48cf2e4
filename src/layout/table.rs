//! Fixed-stride record tables inside the segment

use crate::error::{RtssError, Result};

/// Location of a record array: `count` records of `stride` bytes starting
/// at `offset` from the segment base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTable {
    offset: usize,
    stride: usize,
    count: u32,
}

impl SlotTable {
    /// Describe a table without checking it against a mapping
    pub fn new(offset: u32, stride: u32, count: u32) -> Self {
        Self {
            offset: offset as usize,
            stride: stride as usize,
            count,
        }
    }

    /// Check that every record lies inside `mapping_len` bytes and that the
    /// stride covers at least `min_stride` bytes.
    pub fn validate(&self, what: &str, mapping_len: usize, min_stride: usize) -> Result<()> {
        if self.count == 0 {
            return Ok(());
        }

        if self.stride < min_stride {
            return Err(RtssError::format(format!(
                "{} stride {} is smaller than the {} bytes required",
                what, self.stride, min_stride
            )));
        }

        let end = self
            .stride
            .checked_mul(self.count as usize)
            .and_then(|len| len.checked_add(self.offset))
            .ok_or_else(|| RtssError::format(format!("{} extent overflows", what)))?;

        if end > mapping_len {
            return Err(RtssError::format(format!(
                "{} ends at byte {} but the mapping is {} bytes",
                what, end, mapping_len
            )));
        }

        Ok(())
    }

    /// Byte offset of record `index`, or `None` past the end of the table
    /// or when the offset does not fit in `usize`
    pub fn entry_offset(&self, index: u32) -> Option<usize> {
        if index >= self.count {
            return None;
        }
        (index as usize)
            .checked_mul(self.stride)
            .and_then(|skip| skip.checked_add(self.offset))
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_offsets() {
        let table = SlotTable::new(1024, 512, 4);
        assert_eq!(table.entry_offset(0), Some(1024));
        assert_eq!(table.entry_offset(3), Some(1024 + 3 * 512));
        assert_eq!(table.entry_offset(4), None);
    }

    #[test]
    fn test_validate_bounds() {
        let table = SlotTable::new(64, 512, 4);
        assert!(table.validate("osd", 64 + 4 * 512, 512).is_ok());
        assert!(table.validate("osd", 64 + 4 * 512 - 1, 512).unwrap_err().is_format());
        assert!(table.validate("osd", 1 << 20, 4608).unwrap_err().is_format());
    }

    #[test]
    fn test_validate_overflow() {
        let table = SlotTable::new(u32::MAX, u32::MAX, u32::MAX);
        assert!(table.validate("app", 1 << 20, 1).unwrap_err().is_format());
    }

    #[test]
    fn test_unvalidated_entry_offset_overflow() {
        let table = SlotTable::new(u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(table.entry_offset(0), Some(u32::MAX as usize));

        // Never panics; on 32-bit targets the far records are unaddressable
        let last = table.entry_offset(u32::MAX - 1);
        if cfg!(target_pointer_width = "64") {
            let expected = (u32::MAX as u64 - 1) * u32::MAX as u64 + u32::MAX as u64;
            assert_eq!(last.map(|offset| offset as u64), Some(expected));
        } else {
            assert_eq!(last, None);
        }
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = SlotTable::new(u32::MAX, 0, 0);
        assert!(table.validate("app", 0, 280).is_ok());
        assert_eq!(table.entry_offset(0), None);
    }
}
