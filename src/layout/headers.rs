//! Header and record structures of the RTSS shared memory layout

use std::mem::{offset_of, size_of};

use crate::error::{RtssError, Result};
use super::constants::*;

/// Segment header at offset 0 of the mapping
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedMemoryHeader {
    /// Must equal [`RTSS_SIGNATURE`]
    pub signature: u32,
    /// Packed `major << 16 | minor`
    pub version: u32,
    /// Stride of the application table
    pub app_entry_size: u32,
    /// Byte offset of the application table
    pub app_arr_offset: u32,
    /// Number of application entries
    pub app_arr_size: u32,
    /// Stride of the OSD table
    pub osd_entry_size: u32,
    /// Byte offset of the OSD table
    pub osd_arr_offset: u32,
    /// Number of OSD entries
    pub osd_arr_size: u32,
    /// Bumped whenever OSD content changes (use atomics for access)
    pub osd_frame: u32,
}

/// Offset of the frame counter inside the header
pub const OSD_FRAME_OFFSET: usize = offset_of!(SharedMemoryHeader, osd_frame);

impl SharedMemoryHeader {
    /// Validate the header signature and version
    pub fn validate(&self) -> Result<()> {
        if self.signature != RTSS_SIGNATURE {
            return Err(RtssError::format(format!(
                "Invalid signature {:#010x}, expected {:#010x}",
                self.signature, RTSS_SIGNATURE
            )));
        }
        if self.version < MIN_SUPPORTED_VERSION {
            return Err(RtssError::format(format!(
                "Unsupported segment version {}.{}",
                self.version >> 16,
                self.version & 0xFFFF
            )));
        }
        Ok(())
    }

    /// Whether OSD text goes to the extended field
    pub fn uses_extended_text(&self) -> bool {
        self.version >= EXTENDED_TEXT_VERSION
    }
}

/// One record of the OSD table
#[repr(C)]
pub struct OsdEntry {
    /// Legacy text, 255 usable bytes
    pub text: [u8; OSD_TEXT_SIZE],
    /// Owner name, empty when the slot is free
    pub owner: [u8; OSD_OWNER_SIZE],
    /// Extended text, only present from version 2.7
    pub text_ex: [u8; OSD_TEXT_EX_SIZE],
}

pub const OSD_TEXT_OFFSET: usize = offset_of!(OsdEntry, text);
pub const OSD_OWNER_OFFSET: usize = offset_of!(OsdEntry, owner);
pub const OSD_TEXT_EX_OFFSET: usize = offset_of!(OsdEntry, text_ex);

/// Smallest OSD stride of a pre-2.7 segment
pub const OSD_ENTRY_LEGACY_SIZE: usize = OSD_TEXT_EX_OFFSET;

/// Full OSD stride of a 2.7+ segment
pub const OSD_ENTRY_SIZE: usize = size_of::<OsdEntry>();

/// Leading fields of an application record; the server appends many more
/// statistics after `frames`, which this crate never reads.
#[repr(C)]
pub struct AppEntryPrefix {
    pub process_id: u32,
    pub name: [u8; APP_NAME_SIZE],
    pub flags: u32,
    pub time0: u32,
    pub time1: u32,
    pub frames: u32,
}

pub const APP_PROCESS_ID_OFFSET: usize = offset_of!(AppEntryPrefix, process_id);
pub const APP_NAME_OFFSET: usize = offset_of!(AppEntryPrefix, name);
pub const APP_FLAGS_OFFSET: usize = offset_of!(AppEntryPrefix, flags);
pub const APP_TIME0_OFFSET: usize = offset_of!(AppEntryPrefix, time0);
pub const APP_TIME1_OFFSET: usize = offset_of!(AppEntryPrefix, time1);
pub const APP_FRAMES_OFFSET: usize = offset_of!(AppEntryPrefix, frames);

/// Smallest application stride this crate can decode
pub const APP_ENTRY_PREFIX_SIZE: usize = size_of::<AppEntryPrefix>();

pub const HEADER_SIZE: usize = size_of::<SharedMemoryHeader>();
