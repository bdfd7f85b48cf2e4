//! Attach capabilities handed to publishers and readers

use crate::error::Result;

use super::{config::SegmentConfig, regions::SegmentView};

/// Something that can produce a fresh view of the segment on demand.
///
/// Every operation attaches, works, and drops the view again; sources
/// never cache a mapping between calls.
pub trait SegmentSource {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Open a new view of the segment
    fn attach(&self) -> Result<SegmentView>;
}

impl<S: SegmentSource + ?Sized> SegmentSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn attach(&self) -> Result<SegmentView> {
        (**self).attach()
    }
}

/// The segment published by a real statistics server
#[derive(Debug, Clone, Default)]
pub struct SystemSegment {
    config: SegmentConfig,
}

impl SystemSegment {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmentConfig {
        &self.config
    }
}

impl SegmentSource for SystemSegment {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn attach(&self) -> Result<SegmentView> {
        SegmentView::open(&self.config)
    }
}
