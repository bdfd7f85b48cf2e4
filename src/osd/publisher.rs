//! Slot claim, update and release for one named OSD publisher

use log::{debug, warn};

use crate::{
    apps::{AppEntry, AppEntryReader},
    error::{RtssError, Result},
    layout::{AttachedSegment, RtssVersion, RESERVED_OSD_SLOT},
    memory::{SegmentSource, SystemSegment},
    probe,
};

use super::identity::{OsdText, OwnerName};

/// First slot a publisher may claim; slot 0 belongs to the server
const FIRST_CLAIMABLE_SLOT: u32 = RESERVED_OSD_SLOT + 1;

/// Result of a successful [`OsdPublisher::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum UpdateOutcome {
    /// Text was written to `slot`; `stored` bytes fit in the field
    Published { slot: u32, stored: usize },
    /// Every slot belongs to someone else; the text was dropped
    TableFull,
}

impl UpdateOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// A named OSD text source.
///
/// The publisher never holds the segment open between calls: each
/// operation attaches, works and detaches. Its only session state is the
/// index of the slot it last wrote, which is always re-checked against the
/// owner field before use.
///
/// Slots are released by [`dispose`](Self::dispose) or, failing that, when
/// the publisher is dropped. Calls on one publisher must be serialized,
/// which `&mut self` enforces; publishers in different processes race
/// benignly for free slots.
#[derive(Debug)]
pub struct OsdPublisher<S: SegmentSource = SystemSegment> {
    source: S,
    name: OwnerName,
    slot: Option<u32>,
    disposed: bool,
}

impl OsdPublisher<SystemSegment> {
    /// Publisher attached to the default named segment
    pub fn new(name: &str) -> Result<Self> {
        Self::with_source(name, SystemSegment::default())
    }
}

impl<S: SegmentSource> OsdPublisher<S> {
    /// Validate `name` and check once that the segment is reachable and
    /// well-formed. No slot is claimed until the first update.
    pub fn with_source(name: &str, source: S) -> Result<Self> {
        let name = OwnerName::new(name)?;

        let segment = AttachedSegment::attach(&source)?;
        debug!(
            "Publisher '{}' attached to {} v{}",
            name,
            segment.name(),
            segment.version()
        );
        drop(segment);

        Ok(Self {
            source,
            name,
            slot: None,
            disposed: false,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Slot written by the last successful update, if still cached
    pub fn slot(&self) -> Option<u32> {
        self.slot
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Show `text` in this publisher's slot, claiming one if needed.
    ///
    /// The text goes to the extended field on 2.7+ segments and to the
    /// legacy field otherwise, cut to the field's capacity. A full table is
    /// not an error: it yields [`UpdateOutcome::TableFull`].
    pub fn update(&mut self, text: &str) -> Result<UpdateOutcome> {
        if self.disposed {
            return Err(RtssError::validation("publisher", "Publisher has been disposed"));
        }
        let text = OsdText::new(text)?;

        let segment = AttachedSegment::attach(&self.source)?;
        let outcome = self.publish(&segment, text);

        if outcome == UpdateOutcome::TableFull {
            warn!(
                "OSD table of {} is full, dropping text from '{}'",
                segment.name(),
                self.name
            );
        }
        Ok(outcome)
    }

    fn publish(&mut self, segment: &AttachedSegment, text: OsdText<'_>) -> UpdateOutcome {
        let count = segment.osd_table().count();
        let owner = self.name.as_bytes();

        let mut start = match self.slot {
            Some(index) if index < count => index,
            Some(index) => {
                debug!("Cached slot {} is past the end of the table", index);
                self.slot = None;
                FIRST_CLAIMABLE_SLOT
            }
            None => FIRST_CLAIMABLE_SLOT,
        };

        loop {
            let mut rescan = false;

            for index in start..count {
                let Some(slot) = segment.osd_slot(index) else {
                    break;
                };

                if self.slot.is_none() && slot.is_unclaimed() {
                    slot.set_owner(owner);
                    // Another process may have claimed the same slot between
                    // our check and our write; whoever reads back wins
                    if slot.is_owned_by(owner) {
                        debug!("'{}' claimed OSD slot {}", self.name, index);
                        self.slot = Some(index);
                    } else {
                        warn!("'{}' lost the race for OSD slot {}", self.name, index);
                        continue;
                    }
                }

                if slot.is_owned_by(owner) {
                    let stored = slot.write_text(text.fit(slot.text_capacity() - 1));
                    segment.bump_osd_frame();
                    self.slot = Some(index);
                    return UpdateOutcome::Published { slot: index, stored };
                }

                if let Some(lost) = self.slot.take() {
                    debug!("'{}' no longer owns OSD slot {}, rescanning", self.name, lost);
                    rescan = true;
                    break;
                }
            }

            if !rescan {
                return UpdateOutcome::TableFull;
            }
            start = FIRST_CLAIMABLE_SLOT;
        }
    }

    /// Zero every slot owned by this publisher's name and forget the cached
    /// slot. Returns how many slots were cleared; calling it again is a
    /// no-op returning 0.
    ///
    /// If the segment cannot be reached the publisher stays live, so a
    /// later call (or drop) retries.
    pub fn dispose(&mut self) -> Result<usize> {
        if self.disposed {
            return Ok(0);
        }

        let segment = AttachedSegment::attach(&self.source)?;
        let cleared = release_owned_slots(&segment, &self.name);

        self.slot = None;
        self.disposed = true;
        debug!("'{}' released {} OSD slot(s)", self.name, cleared);
        Ok(cleared)
    }

    /// Version of the attached segment
    pub fn version(&self) -> Result<RtssVersion> {
        probe::version(&self.source)
    }

    /// Live applications reported by the server
    pub fn app_entries(&self) -> Result<Vec<AppEntry>> {
        AppEntryReader::new(&self.source).scan()
    }
}

impl<S: SegmentSource> Drop for OsdPublisher<S> {
    fn drop(&mut self) {
        if let Err(e) = self.dispose() {
            warn!("Failed to release OSD slots of '{}': {}", self.name, e);
        }
    }
}

/// Zero every claimable slot owned by `owner`, bumping the frame counter
/// once per cleared slot. Duplicate claims left by earlier races are
/// cleared too.
pub(crate) fn release_owned_slots(segment: &AttachedSegment, owner: &OwnerName) -> usize {
    let mut cleared = 0;
    for index in FIRST_CLAIMABLE_SLOT..segment.osd_table().count() {
        let Some(slot) = segment.osd_slot(index) else {
            break;
        };
        if slot.is_owned_by(owner.as_bytes()) {
            slot.clear();
            segment.bump_osd_frame();
            cleared += 1;
        }
    }
    cleared
}

// Losing a claim race needs a second writer between our owner write and its
// read-back; tests/osd_publisher_tests.rs drives that with threads.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemorySegment, SegmentImage};

    fn segment(version: RtssVersion, slots: u32) -> InMemorySegment {
        InMemorySegment::new(&SegmentImage::new(version).with_osd_slots(slots)).unwrap()
    }

    #[test]
    fn test_claims_first_free_slot() {
        let shm = segment(RtssVersion::new(2, 6), 4);
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();
        assert_eq!(publisher.slot(), None);

        let outcome = publisher.update("Hello").unwrap();
        assert_eq!(outcome, UpdateOutcome::Published { slot: 1, stored: 5 });
        assert_eq!(shm.osd_owner(1), "overlay");
        assert_eq!(shm.osd_text(1), "Hello");
        assert_eq!(shm.frame_counter(), 1);
    }

    #[test]
    fn test_skips_reserved_and_foreign_slots() {
        let shm = segment(RtssVersion::new(2, 7), 4);
        shm.set_osd_owner(1, "someone else");
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();

        assert!(publisher.update("x").unwrap().is_published());
        assert_eq!(publisher.slot(), Some(2));
        assert_eq!(shm.osd_owner(0), "");
        assert_eq!(shm.osd_owner(1), "someone else");
    }

    #[test]
    fn test_table_full_is_not_an_error() {
        let shm = segment(RtssVersion::new(2, 7), 3);
        shm.set_osd_owner(1, "a");
        shm.set_osd_owner(2, "b");
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();

        assert_eq!(publisher.update("x").unwrap(), UpdateOutcome::TableFull);
        assert_eq!(publisher.slot(), None);
        assert_eq!(shm.frame_counter(), 0);
    }

    #[test]
    fn test_table_with_only_reserved_slot() {
        let shm = segment(RtssVersion::new(2, 7), 1);
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();
        assert_eq!(publisher.update("x").unwrap(), UpdateOutcome::TableFull);
        assert_eq!(shm.osd_owner(0), "");
    }

    #[test]
    fn test_dispose_clears_stale_duplicates() {
        let shm = segment(RtssVersion::new(2, 7), 6);
        shm.set_osd_owner(1, "foreign");
        shm.set_osd_owner(3, "overlay");
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();

        // Slot 2 is free, so it is claimed before slot 3 is reached
        assert_eq!(
            publisher.update("x").unwrap(),
            UpdateOutcome::Published { slot: 2, stored: 1 }
        );

        assert_eq!(publisher.dispose().unwrap(), 2);
        assert_eq!(shm.claimed_osd_slots(), vec![1]);
        assert_eq!(shm.frame_counter(), 3);
    }

    #[test]
    fn test_update_after_dispose_rejected() {
        let shm = segment(RtssVersion::new(2, 7), 4);
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();
        publisher.dispose().unwrap();
        assert!(publisher.update("x").unwrap_err().is_validation());
    }

    #[test]
    fn test_drop_releases_slot() {
        let shm = segment(RtssVersion::new(2, 7), 4);
        {
            let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();
            let _ = publisher.update("x").unwrap();
            assert_eq!(shm.claimed_osd_slots(), vec![1]);
        }
        assert!(shm.claimed_osd_slots().is_empty());
        assert!(shm.osd_entry_is_zeroed(1));
        assert_eq!(shm.live_views(), 0);
    }

    #[test]
    fn test_failed_dispose_retries() {
        let shm = segment(RtssVersion::new(2, 7), 4);
        let mut publisher = OsdPublisher::with_source("overlay", shm.clone()).unwrap();
        let _ = publisher.update("x").unwrap();

        shm.set_online(false);
        assert!(publisher.dispose().unwrap_err().is_attach());
        assert!(!publisher.is_disposed());

        shm.set_online(true);
        assert_eq!(publisher.dispose().unwrap(), 1);
        assert!(publisher.is_disposed());
    }
}
