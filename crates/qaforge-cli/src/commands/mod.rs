//! Command handlers, one module per subcommand.
//!
//! Handlers translate arguments into engine calls and render the result.
//! No generation logic lives here.

pub mod completions;
pub mod config;
pub mod delete;
pub mod download;
pub mod files;
pub mod generate;
pub mod init;
pub mod list;
pub mod packs;
pub mod status;
pub mod sweep;

use std::fs::{self, File};
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use qaforge_adapters::{Engine, build_engine};
use qaforge_core::application::LifecycleManager;
use qaforge_core::domain::{GeneratedProject, ProjectId, ProjectStatus};
use qaforge_core::error::ErrorCategory;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult, IntoCli};

/// Wire the engine from `[engine]`. Invalid settings are configuration
/// errors (exit 4), not request errors.
pub fn open_engine(config: &AppConfig) -> CliResult<Engine> {
    build_engine(config.engine.clone()).map_err(|e| match e.category() {
        ErrorCategory::Validation => CliError::ConfigError {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        _ => CliError::Core(e),
    })
}

pub fn parse_id(raw: &str) -> CliResult<ProjectId> {
    raw.parse().map_err(|e| CliError::InvalidInput {
        message: format!("'{raw}' is not a project id"),
        source: Some(Box::new(e)),
    })
}

/// Stream a completed project's archive to `dest`. Returns the bytes written.
pub fn save_archive(
    manager: &LifecycleManager,
    id: ProjectId,
    dest: &Path,
    force: bool,
) -> CliResult<u64> {
    if dest.exists() && !force {
        return Err(CliError::OutputExists {
            path: dest.to_path_buf(),
        });
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    let mut download = manager.download(id)?;
    let mut file = File::create(dest)
        .with_cli_context(|| format!("Failed to create '{}'", dest.display()))?;
    match io::copy(&mut download.reader, &mut file) {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(dest);
            Err(CliError::IoError {
                message: format!("Failed to write '{}'", dest.display()),
                source: e,
            })
        }
    }
}

/// The public view of a project record, as printed by `status`, `list` and
/// `generate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: String,
    pub status: ProjectStatus,
    pub progress: u8,
    pub pack: String,
    pub tool: String,
    pub language: String,
    pub test_runner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub file_count: usize,
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
}

impl From<&GeneratedProject> for ProjectView {
    fn from(p: &GeneratedProject) -> Self {
        let config = p.configuration();
        Self {
            id: p.id().to_string(),
            status: p.status(),
            progress: p.progress(),
            pack: p.pack_id().to_string(),
            tool: config.tool.clone(),
            language: config.language.clone(),
            test_runner: config.test_runner.clone(),
            error: p.error().map(str::to_string),
            file_count: p.files().iter().filter(|f| f.is_file()).count(),
            download_count: p.download_count(),
            created_at: p.created_at(),
            expires_at: p.expires_at(),
            archive: p.archive().map(|a| a.display().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use qaforge_core::domain::{Configuration, FileMetadata, PackId};

    fn project() -> GeneratedProject {
        let config: Configuration = serde_json::from_str(
            r#"{"testingType":"API","tool":"RestAssured","language":"Java","testRunner":"TestNG"}"#,
        )
        .unwrap();
        GeneratedProject::new(
            config,
            PackId::new("restassured-java-testng").unwrap(),
            Utc::now(),
            Duration::hours(1),
        )
        .unwrap()
    }

    #[test]
    fn bad_id_is_invalid_input() {
        assert!(matches!(parse_id("not-a-uuid"), Err(CliError::InvalidInput { .. })));
        let id = ProjectId::new();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn view_counts_files_only() {
        let mut p = project();
        p.start().unwrap();
        p.complete(
            vec![
                FileMetadata::directory("src"),
                FileMetadata::file("src/A.java", 10),
                FileMetadata::file("pom.xml", 20),
            ],
            "/tmp/x.zip".into(),
        )
        .unwrap();

        let view = ProjectView::from(&p);
        assert_eq!(view.file_count, 2);
        assert_eq!(view.status, ProjectStatus::Completed);
        assert_eq!(view.pack, "restassured-java-testng");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["testRunner"], "TestNG");
        assert!(json.get("error").is_none());
    }
}
