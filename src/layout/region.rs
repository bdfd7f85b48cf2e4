//! Validated views of the statistics segment

use std::{
    marker::PhantomData,
    mem::align_of,
    ptr,
    sync::atomic::{AtomicU32, Ordering},
};

use log::debug;

use crate::{
    error::{RtssError, Result},
    memory::{SegmentSource, SegmentView},
};

use super::{
    constants::*,
    fields,
    headers::*,
    table::SlotTable,
    version::RtssVersion,
};

/// A mapped segment whose header and tables passed validation.
///
/// The header is snapshotted at attach time; table geometry is assumed
/// stable for the lifetime of one attach.
#[derive(Debug)]
pub struct AttachedSegment {
    view: SegmentView,
    header: SharedMemoryHeader,
    osd: SlotTable,
    apps: SlotTable,
}

impl AttachedSegment {
    /// Attach through `source` and validate what was mapped
    pub fn attach<S: SegmentSource + ?Sized>(source: &S) -> Result<Self> {
        let view = source.attach()?;
        // On error the view drops here, detaching before the error propagates
        Self::validate(view)
    }

    /// Validate an already-opened view
    pub fn validate(view: SegmentView) -> Result<Self> {
        if view.len() < HEADER_SIZE {
            return Err(RtssError::format(format!(
                "Mapping of {} bytes cannot hold the {} byte header",
                view.len(),
                HEADER_SIZE
            )));
        }

        let base = view.as_ptr();
        if (base as usize + OSD_FRAME_OFFSET) % align_of::<AtomicU32>() != 0 {
            return Err(RtssError::format("Frame counter is not 4-byte aligned"));
        }

        let header = unsafe { read_header(base) };
        header.validate()?;

        let osd = SlotTable::new(header.osd_arr_offset, header.osd_entry_size, header.osd_arr_size);
        let osd_min = if header.uses_extended_text() {
            OSD_ENTRY_SIZE
        } else {
            OSD_ENTRY_LEGACY_SIZE
        };
        osd.validate("OSD table", view.len(), osd_min)?;

        let apps = SlotTable::new(header.app_arr_offset, header.app_entry_size, header.app_arr_size);
        apps.validate("application table", view.len(), APP_ENTRY_PREFIX_SIZE)?;

        debug!(
            "Validated segment {} v{} ({} OSD slots, {} app slots)",
            view.name(),
            RtssVersion::from_packed(header.version),
            osd.count(),
            apps.count()
        );

        Ok(Self {
            view,
            header,
            osd,
            apps,
        })
    }

    /// Header as read at attach time
    pub fn header(&self) -> &SharedMemoryHeader {
        &self.header
    }

    pub fn version(&self) -> RtssVersion {
        RtssVersion::from_packed(self.header.version)
    }

    /// Whether OSD text belongs in the extended field
    pub fn uses_extended_text(&self) -> bool {
        self.header.uses_extended_text()
    }

    pub fn osd_table(&self) -> SlotTable {
        self.osd
    }

    pub fn app_table(&self) -> SlotTable {
        self.apps
    }

    pub fn name(&self) -> &str {
        self.view.name()
    }

    fn frame_counter(&self) -> &AtomicU32 {
        // Alignment and bounds were checked in validate()
        unsafe { &*(self.view.as_ptr().add(OSD_FRAME_OFFSET) as *const AtomicU32) }
    }

    /// Current value of the shared frame counter
    pub fn osd_frame(&self) -> u32 {
        self.frame_counter().load(Ordering::SeqCst)
    }

    /// Signal the renderer that OSD content changed; returns the new value
    pub fn bump_osd_frame(&self) -> u32 {
        self.frame_counter().fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    /// Accessor for OSD record `index`
    pub fn osd_slot(&self, index: u32) -> Option<OsdSlot<'_>> {
        let offset = self.osd.entry_offset(index)?;
        Some(OsdSlot {
            base: unsafe { self.view.as_ptr().add(offset) },
            index,
            stride: self.osd.stride(),
            extended: self.uses_extended_text(),
            _segment: PhantomData,
        })
    }

    /// Accessor for application record `index`
    pub fn app_slot(&self, index: u32) -> Option<AppSlot<'_>> {
        let offset = self.apps.entry_offset(index)?;
        Some(AppSlot {
            base: unsafe { self.view.as_ptr().add(offset) },
            _segment: PhantomData,
        })
    }
}

unsafe fn read_header(base: *const u8) -> SharedMemoryHeader {
    ptr::read_volatile(base as *const SharedMemoryHeader)
}

/// One OSD record inside an attached segment
#[derive(Debug)]
pub struct OsdSlot<'a> {
    base: *mut u8,
    index: u32,
    stride: usize,
    extended: bool,
    _segment: PhantomData<&'a AttachedSegment>,
}

impl OsdSlot<'_> {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn owner(&self) -> Vec<u8> {
        unsafe { fields::read_cstr(self.base.add(OSD_OWNER_OFFSET), OSD_OWNER_SIZE) }
    }

    pub fn is_unclaimed(&self) -> bool {
        unsafe { fields::cstr_is_empty(self.base.add(OSD_OWNER_OFFSET)) }
    }

    pub fn is_owned_by(&self, owner: &[u8]) -> bool {
        unsafe { fields::cstr_equals(self.base.add(OSD_OWNER_OFFSET), OSD_OWNER_SIZE, owner) }
    }

    /// Write `owner` into the owner field
    pub fn set_owner(&self, owner: &[u8]) {
        unsafe {
            fields::write_cstr(self.base.add(OSD_OWNER_OFFSET), OSD_OWNER_SIZE, owner);
        }
    }

    /// Capacity of the text field this segment version writes to
    pub fn text_capacity(&self) -> usize {
        if self.extended {
            OSD_TEXT_EX_SIZE
        } else {
            OSD_TEXT_SIZE
        }
    }

    /// Store text in the version-appropriate field, cut to its usable
    /// capacity. Returns the number of bytes stored.
    pub fn write_text(&self, text: &[u8]) -> usize {
        let offset = if self.extended {
            OSD_TEXT_EX_OFFSET
        } else {
            OSD_TEXT_OFFSET
        };
        unsafe { fields::write_cstr(self.base.add(offset), self.text_capacity(), text) }
    }

    /// Text currently shown from this slot
    pub fn text(&self) -> Vec<u8> {
        if self.extended {
            unsafe { fields::read_cstr(self.base.add(OSD_TEXT_EX_OFFSET), OSD_TEXT_EX_SIZE) }
        } else {
            unsafe { fields::read_cstr(self.base.add(OSD_TEXT_OFFSET), OSD_TEXT_SIZE) }
        }
    }

    /// Zero the whole record, owner and both text fields included
    pub fn clear(&self) {
        unsafe {
            ptr::write_bytes(self.base, 0, self.stride);
        }
    }
}

/// One application record inside an attached segment
#[derive(Debug)]
pub struct AppSlot<'a> {
    base: *mut u8,
    _segment: PhantomData<&'a AttachedSegment>,
}

impl AppSlot<'_> {
    pub fn process_id(&self) -> u32 {
        unsafe { fields::read_u32(self.base.add(APP_PROCESS_ID_OFFSET)) }
    }

    pub fn name(&self) -> Vec<u8> {
        unsafe { fields::read_cstr(self.base.add(APP_NAME_OFFSET), APP_NAME_SIZE) }
    }

    pub fn flags(&self) -> u32 {
        unsafe { fields::read_u32(self.base.add(APP_FLAGS_OFFSET)) }
    }

    pub fn time0(&self) -> u32 {
        unsafe { fields::read_u32(self.base.add(APP_TIME0_OFFSET)) }
    }

    pub fn time1(&self) -> u32 {
        unsafe { fields::read_u32(self.base.add(APP_TIME1_OFFSET)) }
    }

    pub fn frames(&self) -> u32 {
        unsafe { fields::read_u32(self.base.add(APP_FRAMES_OFFSET)) }
    }
}
