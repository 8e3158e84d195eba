//! `qaforge packs`: installed template packs.
//!
//! Without an id, lists every pack under `engine.packs_dir` with the
//! combinations it serves. With an id, shows the manifest entry by entry and
//! any file in the pack that the manifest does not list.

use serde::Serialize;
use tracing::warn;

use qaforge_core::{
    application::PackSummary,
    domain::{FALLBACK_PACK, PackId},
};

use crate::{
    cli::PacksArgs,
    commands::open_engine,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackRow {
    id: String,
    fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    file_count: usize,
    serves: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl PackRow {
    fn loaded(summary: PackSummary) -> Self {
        Self {
            fallback: summary.id.as_str() == FALLBACK_PACK,
            id: summary.id.to_string(),
            version: Some(summary.version),
            description: summary.description,
            file_count: summary.file_count,
            serves: summary.serves,
            error: None,
        }
    }

    fn broken(id: &PackId, error: String) -> Self {
        Self {
            id: id.to_string(),
            fallback: id.as_str() == FALLBACK_PACK,
            version: None,
            description: None,
            file_count: 0,
            serves: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntryRow {
    path: String,
    template: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    conditional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackDetail {
    #[serde(flatten)]
    summary: PackSummary,
    files: Vec<EntryRow>,
    unlisted: Vec<String>,
}

pub fn execute(args: PacksArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match args.id {
        Some(id) => show(&id, &config, &output),
        None => list(&config, &output),
    }
}

fn list(config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let engine = open_engine(config)?;
    let ids = engine.registry.list_packs()?;

    let rows: Vec<PackRow> = ids
        .iter()
        .map(|id| match engine.registry.summary(id) {
            Ok(summary) => PackRow::loaded(summary),
            Err(e) => {
                warn!(pack = %id, error = %e, "Pack failed to load");
                PackRow::broken(id, e.to_string())
            }
        })
        .collect();

    if rows.is_empty() {
        output.warning(&format!(
            "No packs found under {}",
            engine.settings.packs_dir.display()
        ))?;
    }
    for row in &rows {
        let marker = if row.fallback { " (fallback)" } else { "" };
        if let Some(error) = &row.error {
            output.warning(&format!("{}{marker}: {error}", row.id))?;
            continue;
        }
        output.header(&format!(
            "{} @ {}{marker}",
            row.id,
            row.version.as_deref().unwrap_or("?")
        ))?;
        if let Some(description) = &row.description {
            output.field("about", description)?;
        }
        output.field("files", row.file_count)?;
        if !row.serves.is_empty() {
            output.field("serves", row.serves.join(", "))?;
        }
    }

    output.json(&rows)?;
    Ok(())
}

fn show(raw: &str, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let id = PackId::new(raw).map_err(|e| CliError::InvalidInput {
        message: format!("'{raw}' is not a pack id"),
        source: Some(Box::new(e)),
    })?;
    let engine = open_engine(config)?;
    let summary = engine.registry.summary(&id)?;
    let pack = engine.registry.load(&id)?;
    let unlisted = engine.packs.unlisted_files(pack.manifest())?;

    let files: Vec<EntryRow> = pack
        .manifest()
        .files
        .iter()
        .map(|entry| EntryRow {
            path: entry.path.to_string(),
            template: entry.is_template,
            conditional: entry.conditional.as_ref().map(ToString::to_string),
            mode: entry.mode.map(|m| m.to_string()),
        })
        .collect();

    output.header(&format!("{} @ {}", summary.id, summary.version))?;
    if let Some(description) = &summary.description {
        output.field("about", description)?;
    }
    if !summary.serves.is_empty() {
        output.field("serves", summary.serves.join(", "))?;
    }
    output.print("")?;
    for row in &files {
        let mut line = format!("  {}", row.path);
        if row.template {
            line.push_str("  [template]");
        }
        if let Some(mode) = &row.mode {
            line.push_str(&format!("  [mode {mode}]"));
        }
        if let Some(conditional) = &row.conditional {
            line.push_str(&format!("  when {conditional}"));
        }
        output.print(&line)?;
    }
    if !unlisted.is_empty() {
        output.print("")?;
        output.warning(&format!(
            "{} file(s) in the pack are not listed in manifest.json and are never emitted:",
            unlisted.len()
        ))?;
        for path in &unlisted {
            output.print(&format!("  {path}"))?;
        }
    }

    output.json(&PackDetail {
        summary,
        files,
        unlisted,
    })?;
    Ok(())
}
