//! In-process stand-in for the statistics segment
//!
//! [`SegmentImage`] lays out a well-formed header and empty tables;
//! [`InMemorySegment`] keeps such an image in an anonymous mapping that all
//! clones share, so a test can hand one clone to a publisher and inspect the
//! slots through another.

use std::{
    mem::offset_of,
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use memmap2::{MmapMut, MmapOptions};

use crate::{
    apps::AppEntry,
    error::{RtssError, Result},
    layout::{
        fields,
        headers::*,
        RtssVersion, APP_NAME_SIZE, OSD_OWNER_SIZE, OSD_TEXT_EX_SIZE, OSD_TEXT_SIZE,
        RTSS_SIGNATURE, SHARED_MEMORY_NAME,
    },
};

use super::{regions::SegmentView, source::SegmentSource};

/// Alignment of each table inside a generated image
const TABLE_ALIGN: usize = 64;

fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

/// Geometry of a generated segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentImage {
    /// Version written to the header
    pub version: RtssVersion,
    /// Number of OSD slots, slot 0 included
    pub osd_slots: u32,
    /// OSD stride; `None` picks the natural stride for `version`
    pub osd_entry_size: Option<u32>,
    /// Number of application slots
    pub app_slots: u32,
    /// Application stride
    pub app_entry_size: u32,
}

impl Default for SegmentImage {
    fn default() -> Self {
        Self {
            version: RtssVersion::new(2, 7),
            osd_slots: 8,
            osd_entry_size: None,
            app_slots: 8,
            app_entry_size: APP_ENTRY_PREFIX_SIZE as u32,
        }
    }
}

impl SegmentImage {
    pub fn new(version: RtssVersion) -> Self {
        Self {
            version,
            ..Default::default()
        }
    }

    pub fn with_osd_slots(mut self, slots: u32) -> Self {
        self.osd_slots = slots;
        self
    }

    pub fn with_osd_entry_size(mut self, size: u32) -> Self {
        self.osd_entry_size = Some(size);
        self
    }

    pub fn with_app_slots(mut self, slots: u32) -> Self {
        self.app_slots = slots;
        self
    }

    pub fn with_app_entry_size(mut self, size: u32) -> Self {
        self.app_entry_size = size;
        self
    }

    fn osd_stride(&self) -> u32 {
        self.osd_entry_size.unwrap_or(if self.version.supports_extended_text() {
            OSD_ENTRY_SIZE as u32
        } else {
            OSD_ENTRY_LEGACY_SIZE as u32
        })
    }

    /// Header describing this image
    pub fn header(&self) -> SharedMemoryHeader {
        let app_offset = align_up(HEADER_SIZE, TABLE_ALIGN);
        let app_len = self.app_entry_size as usize * self.app_slots as usize;
        let osd_offset = align_up(app_offset + app_len, TABLE_ALIGN);

        SharedMemoryHeader {
            signature: RTSS_SIGNATURE,
            version: self.version.packed(),
            app_entry_size: self.app_entry_size,
            app_arr_offset: app_offset as u32,
            app_arr_size: self.app_slots,
            osd_entry_size: self.osd_stride(),
            osd_arr_offset: osd_offset as u32,
            osd_arr_size: self.osd_slots,
            osd_frame: 0,
        }
    }

    /// Total bytes the image occupies
    pub fn size(&self) -> usize {
        let header = self.header();
        header.osd_arr_offset as usize + header.osd_entry_size as usize * header.osd_arr_size as usize
    }

    /// Zero `buf` and write the header into it
    pub fn write_into(&self, buf: &mut [u8]) -> Result<()> {
        let size = self.size();
        if buf.len() < size {
            return Err(RtssError::validation(
                "buf",
                format!("Image needs {} bytes, buffer has {}", size, buf.len()),
            ));
        }

        buf.fill(0);
        self.write_header(buf);
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.size()];
        self.write_header(&mut buf);
        buf
    }

    /// Write the header words into the start of `buf`, which holds at
    /// least the header
    fn write_header(&self, buf: &mut [u8]) {
        let header = self.header();
        let words = [
            header.signature,
            header.version,
            header.app_entry_size,
            header.app_arr_offset,
            header.app_arr_size,
            header.osd_entry_size,
            header.osd_arr_offset,
            header.osd_arr_size,
            header.osd_frame,
        ];
        for (chunk, word) in buf.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
    }

    /// Write the image to `path`, replacing any existing file
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_bytes())
            .map_err(|e| RtssError::from_io(e, "Failed to write segment image"))
    }
}

/// Backing memory shared by every clone and view of an [`InMemorySegment`]
#[derive(Debug)]
pub(crate) struct SimulatedState {
    _mmap: MmapMut,
    base: *mut u8,
    len: usize,
    online: AtomicBool,
    pub(crate) live_views: AtomicUsize,
}

// SAFETY: `base` points into `_mmap`, which lives as long as the state.
// Concurrent access goes through raw pointers only, like a real segment.
unsafe impl Send for SimulatedState {}
unsafe impl Sync for SimulatedState {}

impl SimulatedState {
    pub(crate) fn base(&self) -> *mut u8 {
        self.base
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

/// Simulated segment with the same binary layout as the real one
#[derive(Debug, Clone)]
pub struct InMemorySegment {
    name: String,
    state: Arc<SimulatedState>,
}

impl InMemorySegment {
    /// Map anonymous memory and initialise it from `image`
    pub fn new(image: &SegmentImage) -> Result<Self> {
        let mut mmap = MmapOptions::new()
            .len(image.size())
            .map_anon()
            .map_err(|e| RtssError::from_io(e, "Failed to map simulated segment"))?;
        image.write_into(&mut mmap[..])?;

        let base = mmap.as_mut_ptr();
        let len = mmap.len();

        Ok(Self {
            name: SHARED_MEMORY_NAME.to_string(),
            state: Arc::new(SimulatedState {
                _mmap: mmap,
                base,
                len,
                online: AtomicBool::new(true),
                live_views: AtomicUsize::new(0),
            }),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Simulate the server starting or exiting; attaches fail while offline
    pub fn set_online(&self, online: bool) {
        self.state.online.store(online, Ordering::SeqCst);
    }

    /// Number of views currently attached
    pub fn live_views(&self) -> usize {
        self.state.live_views.load(Ordering::SeqCst)
    }

    pub fn header(&self) -> SharedMemoryHeader {
        unsafe { std::ptr::read_volatile(self.state.base as *const SharedMemoryHeader) }
    }

    pub fn frame_counter(&self) -> u32 {
        self.header().osd_frame
    }

    /// Overwrite the header version
    pub fn set_version(&self, version: RtssVersion) {
        unsafe { fields::write_u32(self.state.base.add(4), version.packed()) }
    }

    /// Overwrite the number of OSD slots the header advertises, as a
    /// restarted server with a smaller table would
    pub fn set_osd_slot_count(&self, count: u32) {
        unsafe {
            fields::write_u32(
                self.state.base.add(offset_of!(SharedMemoryHeader, osd_arr_size)),
                count,
            )
        }
    }

    /// Overwrite the header signature
    pub fn set_signature(&self, signature: u32) {
        unsafe { fields::write_u32(self.state.base, signature) }
    }

    /// # Panics
    /// When `index` is outside the OSD table.
    fn osd_entry(&self, index: u32) -> *mut u8 {
        let header = self.header();
        assert!(index < header.osd_arr_size, "OSD slot {} out of range", index);
        let offset = header.osd_arr_offset as usize + index as usize * header.osd_entry_size as usize;
        unsafe { self.state.base.add(offset) }
    }

    /// # Panics
    /// When `index` is outside the application table.
    fn app_entry(&self, index: u32) -> *mut u8 {
        let header = self.header();
        assert!(index < header.app_arr_size, "app slot {} out of range", index);
        let offset = header.app_arr_offset as usize + index as usize * header.app_entry_size as usize;
        unsafe { self.state.base.add(offset) }
    }

    pub fn osd_owner(&self, index: u32) -> String {
        let raw = unsafe { fields::read_cstr(self.osd_entry(index).add(OSD_OWNER_OFFSET), OSD_OWNER_SIZE) };
        String::from_utf8_lossy(&raw).into_owned()
    }

    /// Legacy text field of slot `index`
    pub fn osd_text(&self, index: u32) -> String {
        let raw = unsafe { fields::read_cstr(self.osd_entry(index).add(OSD_TEXT_OFFSET), OSD_TEXT_SIZE) };
        String::from_utf8_lossy(&raw).into_owned()
    }

    /// Extended text field of slot `index`; empty when the stride has none
    pub fn osd_text_ex(&self, index: u32) -> String {
        if (self.header().osd_entry_size as usize) < OSD_ENTRY_SIZE {
            return String::new();
        }
        let raw = unsafe {
            fields::read_cstr(self.osd_entry(index).add(OSD_TEXT_EX_OFFSET), OSD_TEXT_EX_SIZE)
        };
        String::from_utf8_lossy(&raw).into_owned()
    }

    /// Write an owner name directly, as another process would
    pub fn set_osd_owner(&self, index: u32, owner: &str) {
        unsafe {
            fields::write_cstr(self.osd_entry(index).add(OSD_OWNER_OFFSET), OSD_OWNER_SIZE, owner.as_bytes());
        }
    }

    /// Write legacy text directly, as another process would
    pub fn set_osd_text(&self, index: u32, text: &str) {
        unsafe {
            fields::write_cstr(self.osd_entry(index).add(OSD_TEXT_OFFSET), OSD_TEXT_SIZE, text.as_bytes());
        }
    }

    /// Whether every byte of OSD slot `index` is zero
    pub fn osd_entry_is_zeroed(&self, index: u32) -> bool {
        let stride = self.header().osd_entry_size as usize;
        let entry = self.osd_entry(index);
        (0..stride).all(|i| unsafe { std::ptr::read_volatile(entry.add(i)) } == 0)
    }

    /// Indices whose owner field is non-empty
    pub fn claimed_osd_slots(&self) -> Vec<u32> {
        (0..self.header().osd_arr_size)
            .filter(|&i| unsafe { !fields::cstr_is_empty(self.osd_entry(i).add(OSD_OWNER_OFFSET)) })
            .collect()
    }

    /// Publish an application record, as the server would
    pub fn write_app_entry(&self, index: u32, entry: &AppEntry) {
        let base = self.app_entry(index);
        unsafe {
            fields::write_u32(base.add(APP_PROCESS_ID_OFFSET), entry.process_id);
            fields::write_cstr(base.add(APP_NAME_OFFSET), APP_NAME_SIZE, entry.name.as_bytes());
            fields::write_u32(base.add(APP_FLAGS_OFFSET), entry.flags.bits());
            fields::write_u32(base.add(APP_TIME0_OFFSET), entry.instantaneous_time_start);
            fields::write_u32(base.add(APP_TIME1_OFFSET), entry.instantaneous_time_end);
            fields::write_u32(base.add(APP_FRAMES_OFFSET), entry.instantaneous_frames);
        }
    }

    /// Mark application slot `index` as free
    pub fn clear_app_entry(&self, index: u32) {
        unsafe { fields::write_u32(self.app_entry(index).add(APP_PROCESS_ID_OFFSET), 0) }
    }
}

impl SegmentSource for InMemorySegment {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach(&self) -> Result<SegmentView> {
        if !self.state.online.load(Ordering::SeqCst) {
            return Err(RtssError::attach(&self.name, "statistics server is not running"));
        }
        Ok(SegmentView::simulated(&self.name, Arc::clone(&self.state)))
    }
}
