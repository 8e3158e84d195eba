//! `qaforge delete`: remove a project record and its files.

use qaforge_core::application::ApplicationError;

use crate::{
    cli::ProjectArgs,
    commands::{open_engine, parse_id},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(args: ProjectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let id = parse_id(&args.id)?;
    let engine = open_engine(&config)?;

    if !engine.manager.delete(id)? {
        return Err(CliError::Core(
            ApplicationError::ProjectNotFound { id: id.to_string() }.into(),
        ));
    }

    output.success(&format!("Project {id} deleted"))?;
    output.json(&serde_json::json!({ "id": id.to_string(), "deleted": true }))?;
    Ok(())
}
