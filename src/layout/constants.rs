//! Constants describing the RTSS shared memory layout

/// Name of the file mapping published by the statistics server
pub const SHARED_MEMORY_NAME: &str = "RTSSSharedMemoryV2";

/// Header signature, the multi-character constant `'RTSS'`
pub const RTSS_SIGNATURE: u32 = 0x5254_5353;

/// Oldest segment version this crate attaches to (2.0)
pub const MIN_SUPPORTED_VERSION: u32 = pack_version(2, 0);

/// First segment version carrying the extended OSD text field (2.7)
pub const EXTENDED_TEXT_VERSION: u32 = pack_version(2, 7);

/// Capacity of the OSD owner field, terminator included
pub const OSD_OWNER_SIZE: usize = 256;

/// Capacity of the legacy OSD text field, terminator included
pub const OSD_TEXT_SIZE: usize = 256;

/// Capacity of the extended OSD text field, terminator included
pub const OSD_TEXT_EX_SIZE: usize = 4096;

/// Longest owner name accepted, in encoded bytes
pub const MAX_OWNER_NAME_LEN: usize = OSD_OWNER_SIZE - 1;

/// Longest text accepted by `update`, in encoded bytes
pub const MAX_TEXT_LEN: usize = OSD_TEXT_EX_SIZE - 1;

/// Capacity of the application name field (`MAX_PATH`)
pub const APP_NAME_SIZE: usize = 260;

/// Index of the OSD slot reserved for the server itself
pub const RESERVED_OSD_SLOT: u32 = 0;

/// Pack a `major.minor` pair the way the header stores it
pub const fn pack_version(major: u16, minor: u16) -> u32 {
    ((major as u32) << 16) | minor as u32
}
