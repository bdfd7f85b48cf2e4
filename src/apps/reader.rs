//! Scan of the application statistics table

use log::debug;

use crate::{
    error::Result,
    layout::AttachedSegment,
    memory::SegmentSource,
};

use super::types::{AppEntry, AppFlags};

/// Stateless reader producing owned [`AppEntry`] snapshots
#[derive(Debug, Clone)]
pub struct AppEntryReader<S> {
    source: S,
}

impl<S: SegmentSource> AppEntryReader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Every live application in table order. Slots are reused by the
    /// server, so order and membership can change between calls.
    pub fn scan(&self) -> Result<Vec<AppEntry>> {
        let segment = AttachedSegment::attach(&self.source)?;
        let entries = read_app_entries(&segment);
        debug!(
            "Scanned {} application slots, {} live",
            segment.app_table().count(),
            entries.len()
        );
        Ok(entries)
    }
}

/// Decode the live entries of an attached segment
pub(crate) fn read_app_entries(segment: &AttachedSegment) -> Vec<AppEntry> {
    (0..segment.app_table().count())
        .filter_map(|index| segment.app_slot(index))
        .filter(|slot| slot.process_id() != 0)
        .map(|slot| AppEntry {
            process_id: slot.process_id(),
            name: String::from_utf8_lossy(&slot.name()).into_owned(),
            flags: AppFlags::from_bits(slot.flags()),
            instantaneous_time_start: slot.time0(),
            instantaneous_time_end: slot.time1(),
            instantaneous_frames: slot.frames(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::RtssVersion,
        memory::{InMemorySegment, SegmentImage},
    };

    #[test]
    fn test_empty_table() {
        let segment = InMemorySegment::new(&SegmentImage::default()).unwrap();
        let reader = AppEntryReader::new(segment.clone());
        assert!(reader.scan().unwrap().is_empty());
        assert_eq!(segment.live_views(), 0);
    }

    #[test]
    fn test_wide_stride() {
        let image = SegmentImage::new(RtssVersion::new(2, 14))
            .with_app_slots(3)
            .with_app_entry_size(1024);
        let segment = InMemorySegment::new(&image).unwrap();
        let entry = AppEntry {
            process_id: 42,
            name: "bench.exe".to_string(),
            flags: AppFlags::OPENGL,
            instantaneous_time_start: 10,
            instantaneous_time_end: 510,
            instantaneous_frames: 72,
        };
        segment.write_app_entry(2, &entry);

        let entries = AppEntryReader::new(&segment).scan().unwrap();
        assert_eq!(entries, vec![entry]);
    }
}
