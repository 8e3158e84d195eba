//! `qaforge files`: the listing of a completed project.

use qaforge_core::domain::FileKind;

use crate::{
    cli::ProjectArgs,
    commands::{open_engine, parse_id},
    config::AppConfig,
    error::CliResult,
    output::{OutputManager, human_size},
};

pub fn execute(args: ProjectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let id = parse_id(&args.id)?;
    let engine = open_engine(&config)?;
    let files = engine.manager.list_files(id)?;

    if files.is_empty() {
        output.info("No files yet; the project has not completed")?;
    }
    for entry in &files {
        match (entry.kind, entry.size) {
            (FileKind::Directory, _) => output.print(&format!("{:>10}  {}/", "-", entry.path))?,
            (FileKind::File, size) => output.print(&format!(
                "{:>10}  {}",
                human_size(size.unwrap_or(0)),
                entry.path
            ))?,
        }
    }

    output.json(&files)?;
    Ok(())
}
