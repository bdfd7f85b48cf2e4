//! Segment version lookup

use crate::{
    error::Result,
    layout::{AttachedSegment, RtssVersion},
    memory::SegmentSource,
};

/// Attach, read the header version and detach again
pub fn version<S: SegmentSource + ?Sized>(source: &S) -> Result<RtssVersion> {
    let segment = AttachedSegment::attach(source)?;
    Ok(segment.version())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemorySegment, SegmentImage};

    #[test]
    fn test_reports_header_version() {
        let segment = InMemorySegment::new(&SegmentImage::new(RtssVersion::new(2, 6))).unwrap();
        assert_eq!(version(&segment).unwrap(), RtssVersion::new(2, 6));
        assert_eq!(segment.live_views(), 0);
    }

    #[test]
    fn test_rejects_old_segment() {
        let segment = InMemorySegment::new(&SegmentImage::default()).unwrap();
        segment.set_version(RtssVersion::new(1, 5));
        assert!(version(&segment).unwrap_err().is_format());
        assert_eq!(segment.live_views(), 0);
    }
}
