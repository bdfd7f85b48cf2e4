//! Publish a ticking counter to the RTSS overlay for a few seconds

use rtss_shm::{OsdPublisher, Result, UpdateOutcome};
use std::{thread, time::Duration};

fn main() -> Result<()> {
    env_logger::init();

    let mut osd = OsdPublisher::new("rtss-shm-demo")?;
    println!("Attached to RTSS v{}", osd.version()?);

    for tick in 0..10 {
        match osd.update(&format!("rtss-shm demo\ntick {}", tick))? {
            UpdateOutcome::Published { slot, .. } => println!("tick {} -> slot {}", tick, slot),
            UpdateOutcome::TableFull => println!("tick {} dropped, OSD table full", tick),
        }
        thread::sleep(Duration::from_millis(500));
    }

    osd.dispose()?;
    Ok(())
}
