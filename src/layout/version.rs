//! Segment version decoding

use std::fmt;

use super::constants::{pack_version, EXTENDED_TEXT_VERSION};

/// Decoded `major.minor` segment version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RtssVersion {
    pub major: u16,
    pub minor: u16,
}

impl RtssVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Decode the packed header word
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            major: (packed >> 16) as u16,
            minor: (packed & 0xFFFF) as u16,
        }
    }

    pub const fn packed(&self) -> u32 {
        pack_version(self.major, self.minor)
    }

    /// Whether segments of this version carry the 4096 byte text field
    pub const fn supports_extended_text(&self) -> bool {
        self.packed() >= EXTENDED_TEXT_VERSION
    }
}

impl fmt::Display for RtssVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl From<u32> for RtssVersion {
    fn from(packed: u32) -> Self {
        Self::from_packed(packed)
    }
}
