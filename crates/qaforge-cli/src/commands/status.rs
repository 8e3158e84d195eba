//! `qaforge status`: one project's state and progress.

use crate::{
    cli::ProjectArgs,
    commands::{ProjectView, open_engine, parse_id},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ProjectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let id = parse_id(&args.id)?;
    let engine = open_engine(&config)?;
    let project = engine.manager.get(id)?;
    let view = ProjectView::from(&project);

    output.header(&format!("Project {}", view.id))?;
    output.field("status", view.status)?;
    output.field("progress", format!("{}%", view.progress))?;
    output.field("pack", &view.pack)?;
    output.field(
        "request",
        format!("{} / {} / {}", view.tool, view.language, view.test_runner),
    )?;
    if let Some(error) = &view.error {
        output.field("error", error)?;
    }
    if view.file_count > 0 {
        output.field("files", view.file_count)?;
    }
    output.field("downloads", view.download_count)?;
    output.field("created", view.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    output.field("expires", view.expires_at.format("%Y-%m-%d %H:%M:%S UTC"))?;

    output.json(&view)?;
    Ok(())
}
