//! # rtss-shm - OSD publishing over the RTSS statistics segment
//!
//! A statistics server (RivaTuner Statistics Server) publishes a named shared
//! memory segment holding per-process framerate statistics and a table of
//! on-screen-display text slots. This crate attaches to that segment to
//! publish OSD text and to read the statistics. It never creates the
//! segment; the server must already be running.
//!
//! ## Features
//!
//! - **Scoped attach**: every operation maps, validates and unmaps the
//!   segment; nothing stays mapped between calls
//! - **Advisory slot ownership**: slots are claimed by owner name and
//!   re-verified on every update, so stolen or reset slots are reclaimed
//! - **Guaranteed cleanup**: disposing or dropping a publisher zeroes every
//!   slot carrying its name
//! - **Injectable segment**: publishers take any [`SegmentSource`], including
//!   the in-process [`InMemorySegment`] used by tests
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │  OsdPublisher            │   │  AppEntryReader / probe  │
//! │  claim · update · dispose│   │  scan · version          │
//! └────────────┬─────────────┘   └────────────┬─────────────┘
//!              └──────────────┬───────────────┘
//!                             ▼
//!              ┌──────────────────────────────┐
//!              │ AttachedSegment (validated)  │
//!              │ header · SlotTable · slots   │
//!              └──────────────┬───────────────┘
//!                             ▼
//!              ┌──────────────────────────────┐
//!              │ SegmentSource → SegmentView  │
//!              │ named · file · in-memory     │
//!              └──────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use rtss_shm::OsdPublisher;
//!
//! # fn main() -> rtss_shm::Result<()> {
//! let mut osd = OsdPublisher::new("my-overlay")?;
//! let _ = osd.update("Frame time: 16.6 ms")?;
//! osd.dispose()?;
//! # Ok(())
//! # }
//! ```

pub mod apps;
pub mod error;
pub mod layout;
pub mod memory;
pub mod osd;
pub mod probe;

pub use apps::{AppEntry, AppEntryReader, AppFlags};
pub use error::{Result, RtssError};
pub use layout::{AttachedSegment, RtssVersion, SlotTable};
pub use memory::{
    BackingType, InMemorySegment, SegmentConfig, SegmentImage, SegmentSource, SegmentView,
    SystemSegment,
};
pub use osd::{OsdPublisher, OsdSlotInfo, UpdateOutcome};

/// Version of the segment published by the default statistics server
pub fn version() -> Result<RtssVersion> {
    probe::version(&SystemSegment::default())
}

/// Live applications reported by the default statistics server
pub fn app_entries() -> Result<Vec<AppEntry>> {
    AppEntryReader::new(SystemSegment::default()).scan()
}
