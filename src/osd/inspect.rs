//! Read-only listing and out-of-band cleanup of OSD slots

use log::debug;

use crate::{
    error::Result,
    layout::AttachedSegment,
    memory::SegmentSource,
};

use super::{identity::OwnerName, publisher::release_owned_slots};

/// Snapshot of one claimed OSD slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsdSlotInfo {
    pub index: u32,
    pub owner: String,
    /// Content of the field the segment's version renders
    pub text: String,
}

/// Every slot with a non-empty owner, the server's slot 0 included
pub fn osd_slots<S: SegmentSource + ?Sized>(source: &S) -> Result<Vec<OsdSlotInfo>> {
    let segment = AttachedSegment::attach(source)?;
    let slots = (0..segment.osd_table().count())
        .filter_map(|index| segment.osd_slot(index))
        .filter(|slot| !slot.is_unclaimed())
        .map(|slot| OsdSlotInfo {
            index: slot.index(),
            owner: String::from_utf8_lossy(&slot.owner()).into_owned(),
            text: String::from_utf8_lossy(&slot.text()).into_owned(),
        })
        .collect();
    Ok(slots)
}

/// Clear the slots of a publisher that exited without disposing
pub fn release_owner<S: SegmentSource + ?Sized>(source: &S, name: &str) -> Result<usize> {
    let owner = OwnerName::new(name)?;
    let segment = AttachedSegment::attach(source)?;
    let cleared = release_owned_slots(&segment, &owner);
    debug!("Released {} OSD slot(s) left by '{}'", cleared, owner);
    Ok(cleared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        layout::RtssVersion,
        memory::{InMemorySegment, SegmentImage},
    };

    #[test]
    fn test_lists_claimed_slots() {
        let shm = InMemorySegment::new(&SegmentImage::new(RtssVersion::new(2, 6))).unwrap();
        shm.set_osd_owner(0, "RTSS");
        shm.set_osd_owner(4, "overlay");
        shm.set_osd_text(4, "FPS 60");

        let slots = osd_slots(&shm).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].owner, "RTSS");
        assert_eq!(
            slots[1],
            OsdSlotInfo {
                index: 4,
                owner: "overlay".to_string(),
                text: "FPS 60".to_string(),
            }
        );
    }

    #[test]
    fn test_release_owner_leaves_slot_zero() {
        let shm = InMemorySegment::new(&SegmentImage::default()).unwrap();
        shm.set_osd_owner(0, "ghost");
        shm.set_osd_owner(2, "ghost");
        shm.set_osd_owner(5, "ghost");

        assert_eq!(release_owner(&shm, "ghost").unwrap(), 2);
        assert_eq!(shm.claimed_osd_slots(), vec![0]);
        assert_eq!(shm.frame_counter(), 2);
        assert!(release_owner(&shm, "").unwrap_err().is_validation());
    }
}
