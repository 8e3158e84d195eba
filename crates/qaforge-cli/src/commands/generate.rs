//! `qaforge generate`: submit a configuration and wait for the result.
//!
//! Generation runs on the engine's blocking pool while this task polls the
//! record and drives the progress bar. A CLI process cannot leave work
//! running behind it, so the command always waits for `completed` or
//! `failed`. The expiry sweeper runs alongside for the lifetime of the
//! command.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument};

use qaforge_core::domain::{Configuration, GeneratedProject, ProjectStatus};

use crate::{
    cli::GenerateArgs,
    commands::{ProjectView, open_engine, save_archive},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::{OutputManager, human_size},
};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateReport {
    #[serde(flatten)]
    project: ProjectView,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

#[instrument(skip_all, fields(config = %args.config.display()))]
pub async fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let request = read_request(&args.config)?;
    if let Some(dest) = args.output.as_ref().filter(|d| d.exists() && !args.force) {
        return Err(CliError::OutputExists { path: dest.clone() });
    }
    let engine = open_engine(&config)?;
    let manager = engine.manager;
    let sweeper = Arc::clone(&manager).spawn_sweeper(engine.settings.sweep_interval());

    let (accepted, task) = manager.submit(request)?;
    let id = accepted.id();
    output.info(&format!("Project {id} accepted (pack {})", accepted.pack_id()))?;

    let bar = output.progress_bar(!args.no_progress);
    let finished = loop {
        let current = manager.get(id)?;
        bar.set_position(u64::from(current.progress()));
        bar.set_message(current.status().to_string());
        if current.status().is_terminal() {
            break current;
        }
        if task.is_finished() {
            // The worker is gone; one last read decides.
            let last = manager.get(id)?;
            if last.status().is_terminal() {
                break last;
            }
            bar.abandon();
            sweeper.abort();
            return Err(CliError::Runtime {
                message: format!("generation of {id} stopped in state '{}'", last.status()),
            });
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };
    bar.finish_and_clear();
    sweeper.abort();
    debug!(status = %finished.status(), "Generation finished");

    if finished.status() == ProjectStatus::Failed {
        return Err(CliError::GenerationFailed {
            id: id.to_string(),
            reason: finished.error().unwrap_or("unknown error").to_string(),
        });
    }

    let saved_to = match &args.output {
        Some(dest) => {
            let written = save_archive(&manager, id, dest, args.force)?;
            info!(dest = %dest.display(), bytes = written, "Archive saved");
            Some(dest.display().to_string())
        }
        None => None,
    };

    report(&finished, saved_to, &output)
}

fn report(project: &GeneratedProject, saved_to: Option<String>, output: &OutputManager) -> CliResult<()> {
    let view = ProjectView::from(project);

    output.success(&format!("Project {} generated", view.id))?;
    output.field("pack", &view.pack)?;
    output.field("files", view.file_count)?;
    let size: u64 = project.files().iter().filter_map(|f| f.size).sum();
    output.field("size", human_size(size))?;
    match &saved_to {
        Some(path) => output.field("saved to", path)?,
        None => {
            if let Some(archive) = &view.archive {
                output.field("archive", archive)?;
            }
        }
    }
    output.field("expires", view.expires_at.format("%Y-%m-%d %H:%M UTC"))?;

    output.json(&GenerateReport {
        project: view,
        saved_to,
    })?;
    Ok(())
}

/// Read and parse the request; `-` reads stdin.
fn read_request(path: &Path) -> CliResult<Configuration> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .with_cli_context(|| "Failed to read the configuration from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read '{}'", path.display()))?
    };
    parse_request(&text, path)
}

fn parse_request(text: &str, origin: &Path) -> CliResult<Configuration> {
    serde_json::from_str(text).map_err(|e| CliError::InvalidInput {
        message: format!("'{}' is not a valid project configuration: {e}", origin.display()),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_request_document() {
        let config = parse_request(
            r#"{"testingType":"Web","tool":"Playwright","language":"TypeScript",
                "testRunner":"Playwright","utilities":{"logger":true}}"#,
            Path::new("p.json"),
        )
        .unwrap();
        assert_eq!(config.tool, "Playwright");
        assert!(config.utilities.contains("logger"));
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let err = parse_request("{\"tool\": ", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { .. }));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_request(Path::new("/no/such/request.json")).unwrap_err();
        assert!(matches!(err, CliError::IoError { .. }));
    }
}
