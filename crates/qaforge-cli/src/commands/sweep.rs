//! `qaforge sweep`: purge expired projects, optionally recovering records
//! a crashed process left behind.

use tracing::info;

use crate::{
    cli::SweepArgs,
    commands::open_engine,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: SweepArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = open_engine(&config)?;

    let recovered = if args.recover {
        engine.manager.recover_interrupted()?
    } else {
        0
    };
    let swept = engine.manager.sweep_expired()?;
    info!(swept, recovered, "Sweep finished");

    if args.recover {
        output.success(&format!(
            "Removed {swept} expired project(s), marked {recovered} interrupted project(s) failed"
        ))?;
    } else {
        output.success(&format!("Removed {swept} expired project(s)"))?;
    }
    output.json(&serde_json::json!({ "swept": swept, "recovered": recovered }))?;
    Ok(())
}
