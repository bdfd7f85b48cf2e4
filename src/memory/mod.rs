//! Attaching to the statistics segment

pub mod config;
#[cfg(windows)]
mod named;
pub mod regions;
pub mod simulated;
pub mod source;

pub use config::{BackingType, SegmentConfig};
pub use regions::SegmentView;
pub use simulated::{InMemorySegment, SegmentImage};
pub use source::{SegmentSource, SystemSegment};
