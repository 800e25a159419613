//! Ember - elemental combat sandbox
//!
//! Runs a scripted encounter against the combat engine and logs the result.
//!
//! Usage: `ember [settings.toml]` or `ember --write-default`

mod sandbox;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use ember_core::GameTime;

use sandbox::Sandbox;
use settings::SandboxSettings;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--write-default") {
        let path = SandboxSettings::default()
            .save()
            .context("Failed to write default settings")?;
        println!("{}", path.display());
        return Ok(());
    }

    info!("Starting Ember sandbox...");
    let settings = SandboxSettings::load(arg.map(PathBuf::from).as_deref());

    let mut time = GameTime::new(settings.time.clone());
    let mut sandbox = Sandbox::new(&settings);
    let report = sandbox.run(&mut time);

    info!(
        "Encounter over after {:.1}s ({} ticks, {} frames)",
        report.elapsed, report.ticks, time.frame_count
    );
    for (tag, amount) in report.damage {
        info!("  {:<9} {:>8.1} damage", tag.name(), amount);
    }
    info!(
        "  {} kills, {} freezes, {} pulses across {} fields",
        report.kills, report.freezes, report.pulses, report.pulsed_fields
    );
    match report.boss_hp {
        Some(hp) => info!(
            "  {} enemies and the boss ({:.0} hp) still standing",
            report.survivors, hp
        ),
        None => info!("  {} enemies still standing", report.survivors),
    }

    Ok(())
}
