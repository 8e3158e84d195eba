//! `qaforge download`: copy a completed project's archive to disk.

use crate::{
    cli::DownloadArgs,
    commands::{open_engine, parse_id, save_archive},
    config::AppConfig,
    error::CliResult,
    output::{OutputManager, human_size},
};

pub fn execute(args: DownloadArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let id = parse_id(&args.id)?;
    let engine = open_engine(&config)?;
    let written = save_archive(&engine.manager, id, &args.output, args.force)?;

    output.success(&format!(
        "Saved {} to {}",
        human_size(written),
        args.output.display()
    ))?;
    output.json(&serde_json::json!({
        "id": id.to_string(),
        "savedTo": args.output.display().to_string(),
        "bytes": written,
    }))?;
    Ok(())
}
