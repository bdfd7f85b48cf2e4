//! On-screen display publishing
//!
//! A publisher owns OSD slots by writing its name into their owner field.
//! The segment offers no locking, so ownership is advisory: every update
//! re-checks the owner field, and disposal clears every slot carrying the
//! publisher's name.

pub mod identity;
pub mod inspect;
pub mod publisher;

pub use identity::{OsdText, OwnerName};
pub use inspect::{osd_slots, release_owner, OsdSlotInfo};
pub use publisher::{OsdPublisher, UpdateOutcome};
