use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use rtss_shm::{
    osd::{osd_slots, release_owner},
    probe, AppEntryReader, OsdPublisher, Result, RtssError, SegmentConfig, SystemSegment,
    UpdateOutcome,
};
use std::{path::PathBuf, thread, time::Duration};

fn main() -> Result<()> {
    env_logger::init();

    let matches = App::new("rtss-cli")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect and publish to the RTSS statistics segment")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("segment")
                .short("s")
                .long("segment")
                .value_name("NAME")
                .help("Name of the shared memory segment")
                .default_value("RTSSSharedMemoryV2")
                .takes_value(true)
                .global(true),
        )
        .arg(
            Arg::with_name("file")
                .short("f")
                .long("file")
                .value_name("FILE")
                .help("Map an existing file instead of the named segment")
                .takes_value(true)
                .global(true),
        )
        .subcommand(SubCommand::with_name("version").about("Print the segment version"))
        .subcommand(SubCommand::with_name("apps").about("List applications with live statistics"))
        .subcommand(SubCommand::with_name("slots").about("List claimed OSD slots"))
        .subcommand(
            SubCommand::with_name("osd")
                .about("Publish OSD text, then release the slot")
                .arg(
                    Arg::with_name("name")
                        .short("n")
                        .long("name")
                        .value_name("NAME")
                        .help("Owner name of the OSD entry")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("text")
                        .short("t")
                        .long("text")
                        .value_name("TEXT")
                        .help("Text to display")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("hold")
                        .long("hold")
                        .value_name("SECS")
                        .help("Seconds to keep the text on screen")
                        .default_value("5")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("clear")
                .about("Remove OSD entries left behind by an owner")
                .arg(
                    Arg::with_name("name")
                        .short("n")
                        .long("name")
                        .value_name("NAME")
                        .help("Owner name to clear")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .get_matches();

    let source = SystemSegment::new(segment_config(&matches));

    match matches.subcommand() {
        ("version", Some(_)) => {
            println!("{}", probe::version(&source)?);
        }
        ("apps", Some(_)) => show_apps(&source)?,
        ("slots", Some(_)) => show_slots(&source)?,
        ("osd", Some(osd_matches)) => publish(source, osd_matches)?,
        ("clear", Some(clear_matches)) => {
            let name = required(clear_matches, "name")?;
            let cleared = release_owner(&source, name)?;
            println!("Cleared {} slot(s) owned by '{}'", cleared, name);
        }
        _ => println!("Use --help for usage information"),
    }
    Ok(())
}

fn segment_config(matches: &ArgMatches) -> SegmentConfig {
    // Global args may have been given after the subcommand
    let value_of = |arg: &str| {
        matches
            .subcommand()
            .1
            .and_then(|sub| sub.value_of(arg))
            .or_else(|| matches.value_of(arg))
    };

    let name = value_of("segment").unwrap_or("RTSSSharedMemoryV2");
    match value_of("file") {
        Some(path) => SegmentConfig {
            name: name.to_string(),
            ..SegmentConfig::file(PathBuf::from(path))
        },
        None => SegmentConfig::new(name),
    }
}

fn required<'a>(matches: &'a ArgMatches, arg: &str) -> Result<&'a str> {
    matches
        .value_of(arg)
        .ok_or_else(|| RtssError::validation(arg, "Missing required argument"))
}

fn show_apps(source: &SystemSegment) -> Result<()> {
    let entries = AppEntryReader::new(source).scan()?;
    if entries.is_empty() {
        println!("No applications found");
        return Ok(());
    }

    println!("{:>8}  {:<32} {:>8}  {}", "PID", "NAME", "FPS", "API");
    for entry in entries {
        let fps = entry
            .instantaneous_fps()
            .map(|fps| format!("{:.1}", fps))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>8}  {:<32} {:>8}  {}",
            entry.process_id, entry.name, fps, entry.flags
        );
    }
    Ok(())
}

fn show_slots(source: &SystemSegment) -> Result<()> {
    let slots = osd_slots(source)?;
    if slots.is_empty() {
        println!("No OSD slots claimed");
        return Ok(());
    }

    for slot in slots {
        println!("[{}] {}: {}", slot.index, slot.owner, slot.text.replace('\n', "\\n"));
    }
    Ok(())
}

fn publish(source: SystemSegment, matches: &ArgMatches) -> Result<()> {
    let name = required(matches, "name")?;
    let text = required(matches, "text")?;
    let hold: u64 = required(matches, "hold")?
        .parse()
        .map_err(|_| RtssError::validation("hold", "Invalid number of seconds"))?;

    let mut publisher = OsdPublisher::with_source(name, source)?;
    match publisher.update(text)? {
        UpdateOutcome::Published { slot, stored } => {
            println!("Published {} bytes to slot {}", stored, slot);
        }
        UpdateOutcome::TableFull => {
            println!("OSD table is full, nothing published");
        }
    }

    thread::sleep(Duration::from_secs(hold));

    let cleared = publisher.dispose()?;
    println!("Released {} slot(s)", cleared);
    Ok(())
}
