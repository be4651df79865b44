//! Small command-line panel for the speakers on the local network.
//!
//! ```text
//! cargo run --example sonos_panel                       # list speakers
//! cargo run --example sonos_panel -- play "Living Room"
//! cargo run --example sonos_panel -- volume Kitchen 30
//! cargo run --example sonos_panel -- now-playing Kitchen
//! ```
//!
//! The configuration file defaults to `sonoscontrol.yaml` and can be moved
//! with `SONOSCONTROL_CONFIG`.

use std::env;

use anyhow::{Context, Result, bail};
use sonoscontrol::{ControllerConfig, SonosController, init_logging};

const USAGE: &str = "usage: sonos_panel [list | play|pause|stop <name> \
                     | volume <name> <0-100> | now-playing <name>]";

fn main() -> Result<()> {
    let config_path =
        env::var("SONOSCONTROL_CONFIG").unwrap_or_else(|_| "sonoscontrol.yaml".into());
    let config = ControllerConfig::load(&config_path)?;
    init_logging(&config.log_level);
    tracing::info!("Starting Sonos panel...");

    let controller = SonosController::new(config);
    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] | ["list"] => list(&controller),
        ["play", name] => report("Play", name, controller.play(name)),
        ["pause", name] => report("Pause", name, controller.pause(name)),
        ["stop", name] => report("Stop", name, controller.stop(name)),
        ["volume", name, level] => {
            let level: i32 = level
                .parse()
                .with_context(|| format!("'{}' is not a volume level", level))?;
            report("Volume", name, controller.set_volume(name, level))
        }
        ["now-playing", name] => match controller.query_now_playing(name) {
            Some(track) => {
                println!("Title  : {}", track.title);
                println!("Artist : {}", track.artist);
                println!("Album  : {}", track.album);
                Ok(())
            }
            None => bail!("could not read the current track of '{}'", name),
        },
        _ => bail!(USAGE),
    }
}

fn list(controller: &SonosController) -> Result<()> {
    let devices = controller.list_devices();

    println!("=====================");
    println!("Speakers detected : {}", devices.len());
    for device in &devices {
        println!("- {} ({})", device.name, device.address);
    }
    println!("=====================");

    if devices.is_empty() {
        println!("No speaker answered. Check that this machine is on the same network.");
    }
    Ok(())
}

fn report(action: &str, name: &str, ok: bool) -> Result<()> {
    if ok {
        println!("{} sent to '{}'", action, name);
        Ok(())
    } else {
        bail!("{} failed on '{}'", action, name)
    }
}
