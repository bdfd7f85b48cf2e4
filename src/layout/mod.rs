//! Binary layout of the RTSS statistics segment
//!
//! The segment starts with a fixed header followed by two record tables:
//! 1. Application table (per-process framerate statistics, read-only here)
//! 2. OSD table (text entries claimed by publishers; slot 0 is the server's)
//!
//! Table offsets, strides and counts come from the header, so the same code
//! handles every 2.x revision of the format.

pub mod constants;
pub(crate) mod fields;
pub mod headers;
pub mod region;
pub mod table;
pub mod version;

pub use constants::*;
pub use headers::{AppEntryPrefix, OsdEntry, SharedMemoryHeader};
pub use region::{AppSlot, AttachedSegment, OsdSlot};
pub use table::SlotTable;
pub use version::RtssVersion;
