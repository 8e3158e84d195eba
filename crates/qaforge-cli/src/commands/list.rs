//! Implementation of the `qaforge list` command.

use qaforge_core::domain::ProjectStatus;

use crate::{
    cli::{ListArgs, StatusFilter},
    commands::{ProjectView, open_engine},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let engine = open_engine(&config)?;
    let projects: Vec<ProjectView> = engine
        .manager
        .list_all()?
        .iter()
        .filter(|p| args.status.is_none_or(|s| status_of(s) == p.status()))
        .map(ProjectView::from)
        .collect();

    if projects.is_empty() {
        output.info("No live projects")?;
    } else {
        output.header(&format!(
            "{:<36}  {:<10}  {:>4}  {:<24}  CREATED",
            "ID", "STATUS", "PROG", "PACK"
        ))?;
        for p in &projects {
            output.print(&format!(
                "{:<36}  {:<10}  {:>3}%  {:<24}  {}",
                p.id,
                p.status.as_str(),
                p.progress,
                p.pack,
                p.created_at.format("%Y-%m-%d %H:%M")
            ))?;
        }
    }

    output.json(&projects)?;
    Ok(())
}

fn status_of(filter: StatusFilter) -> ProjectStatus {
    match filter {
        StatusFilter::Pending => ProjectStatus::Pending,
        StatusFilter::Generating => ProjectStatus::Generating,
        StatusFilter::Completed => ProjectStatus::Completed,
        StatusFilter::Failed => ProjectStatus::Failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_map_to_statuses() {
        assert_eq!(status_of(StatusFilter::Failed), ProjectStatus::Failed);
        assert_eq!(status_of(StatusFilter::Pending).as_str(), "pending");
    }
}
