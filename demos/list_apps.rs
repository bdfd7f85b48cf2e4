//! Print the framerate of every application RTSS is hooked into

use rtss_shm::Result;

fn main() -> Result<()> {
    env_logger::init();

    println!("RTSS v{}", rtss_shm::version()?);
    for app in rtss_shm::app_entries()? {
        match app.instantaneous_fps() {
            Some(fps) => println!("{} ({:.1} fps)", app, fps),
            None => println!("{}", app),
        }
    }
    Ok(())
}
