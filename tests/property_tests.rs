//! Property tests for name and text limits

use proptest::prelude::*;
use rtss_shm::{
    layout::RtssVersion,
    memory::{InMemorySegment, SegmentImage},
    OsdPublisher, UpdateOutcome,
};

fn segment(extended: bool) -> InMemorySegment {
    let version = if extended {
        RtssVersion::new(2, 7)
    } else {
        RtssVersion::new(2, 6)
    };
    InMemorySegment::new(&SegmentImage::new(version).with_osd_slots(4)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_valid_names_construct_without_claiming(name in "[a-zA-Z0-9_.-]{1,255}") {
        let shm = segment(true);
        let publisher = OsdPublisher::with_source(&name, shm.clone()).unwrap();
        prop_assert!(shm.claimed_osd_slots().is_empty());
        prop_assert_eq!(publisher.name(), name.as_str());
    }

    #[test]
    fn prop_oversized_names_rejected(len in 256usize..600) {
        let shm = segment(true);
        let err = OsdPublisher::with_source(&"n".repeat(len), shm).unwrap_err();
        prop_assert!(err.is_validation());
    }

    #[test]
    fn prop_stored_text_matches_field(text in "[ -~]{0,4095}", extended in any::<bool>()) {
        let shm = segment(extended);
        let mut publisher = OsdPublisher::with_source("prop", shm.clone()).unwrap();

        let outcome = publisher.update(&text).unwrap();
        let expected = if extended { text.clone() } else { text.chars().take(255).collect() };
        prop_assert_eq!(outcome, UpdateOutcome::Published { slot: 1, stored: expected.len() });

        if extended {
            prop_assert_eq!(shm.osd_text_ex(1), expected);
        } else {
            prop_assert_eq!(shm.osd_text(1), expected);
        }
    }

    #[test]
    fn prop_dispose_leaves_no_owned_slot(updates in 1usize..5, stray in 1u32..4) {
        let shm = segment(true);
        shm.set_osd_owner(stray, "prop");
        let mut publisher = OsdPublisher::with_source("prop", shm.clone()).unwrap();
        for i in 0..updates {
            let _ = publisher.update(&i.to_string()).unwrap();
        }

        publisher.dispose().unwrap();
        for index in 0..4 {
            prop_assert_ne!(shm.osd_owner(index), "prop");
        }
    }
}
