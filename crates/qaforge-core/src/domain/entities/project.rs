//! Generated project record and its state machine.
//!
//! ```text
//! pending ──start──▶ generating ──complete──▶ completed
//!                         │
//!                         └────────fail──────▶ failed
//! ```
//!
//! Invariant: `files` is non-empty and `archive` is set iff the status is
//! `completed`. Progress never decreases.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;
use super::configuration::Configuration;
use super::manifest::PackId;

// ── ProjectId ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ProjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidConfiguration(format!("'{s}' is not a project id")))
    }
}

// ── ProjectStatus ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl ProjectStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub const fn can_transition_to(self, next: ProjectStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Generating)
                | (Self::Generating, Self::Completed)
                | (Self::Generating, Self::Failed)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── FileMetadata ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Directory,
}

/// One entry of a project's public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// `/`-separated, relative to the project root.
    pub path: String,
    pub name: String,
    /// Byte size; files only.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<u64>,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

impl FileMetadata {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self::with_kind(path.into(), Some(size), FileKind::File)
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self::with_kind(path.into(), None, FileKind::Directory)
    }

    fn with_kind(path: String, size: Option<u64>, kind: FileKind) -> Self {
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            path,
            name,
            size,
            kind,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }
}

// ── ArchiveSummary ───────────────────────────────────────────────────────────

/// What the archiver produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub compressed_size: u64,
    pub file_entries: usize,
    pub directory_entries: usize,
}

// ── GeneratedProject ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedProject {
    id: ProjectId,
    configuration: Configuration,
    pack_id: PackId,
    status: ProjectStatus,
    progress: u8,
    files: Vec<FileMetadata>,
    archive: Option<PathBuf>,
    download_count: u64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    error: Option<String>,
}

impl GeneratedProject {
    /// New `pending` record expiring `ttl` after `created_at`.
    pub fn new(
        configuration: Configuration,
        pack_id: PackId,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, DomainError> {
        if ttl <= Duration::zero() {
            return Err(DomainError::InvalidConfiguration(
                "project time-to-live must be positive".into(),
            ));
        }
        Ok(Self {
            id: ProjectId::new(),
            configuration,
            pack_id,
            status: ProjectStatus::Pending,
            progress: 0,
            files: Vec::new(),
            archive: None,
            download_count: 0,
            created_at,
            expires_at: created_at + ttl,
            error: None,
        })
    }

    fn transition(&mut self, next: ProjectStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// `pending → generating`.
    pub fn start(&mut self) -> Result<(), DomainError> {
        self.transition(ProjectStatus::Generating)
    }

    /// Raise progress while generating. Lower values and other states are ignored.
    pub fn advance(&mut self, progress: u8) {
        if self.status == ProjectStatus::Generating {
            self.progress = self.progress.max(progress.min(100));
        }
    }

    /// `generating → completed`. Requires a non-empty listing.
    pub fn complete(&mut self, files: Vec<FileMetadata>, archive: PathBuf) -> Result<(), DomainError> {
        if files.is_empty() {
            return Err(DomainError::IncompleteProject {
                reason: "no files were generated".into(),
            });
        }
        self.transition(ProjectStatus::Completed)?;
        self.files = files;
        self.archive = Some(archive);
        self.progress = 100;
        Ok(())
    }

    /// `generating → failed`. `message` is the stage-level summary only.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), DomainError> {
        self.transition(ProjectStatus::Failed)?;
        self.files.clear();
        self.archive = None;
        self.error = Some(message.into());
        Ok(())
    }

    pub fn record_download(&mut self) {
        self.download_count += 1;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
    pub fn pack_id(&self) -> &PackId {
        &self.pack_id
    }
    pub fn status(&self) -> ProjectStatus {
        self.status
    }
    pub fn progress(&self) -> u8 {
        self.progress
    }
    pub fn files(&self) -> &[FileMetadata] {
        &self.files
    }
    pub fn archive(&self) -> Option<&Path> {
        self.archive.as_deref()
    }
    pub fn download_count(&self) -> u64 {
        self.download_count
    }
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> GeneratedProject {
        GeneratedProject::new(
            Configuration::default(),
            PackId::new("demo").unwrap(),
            Utc::now(),
            Duration::hours(24),
        )
        .unwrap()
    }

    #[test]
    fn only_forward_transitions() {
        use ProjectStatus::*;
        let all = [Pending, Generating, Completed, Failed];
        let allowed = [(Pending, Generating), (Generating, Completed), (Generating, Failed)];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn happy_path() {
        let mut p = project();
        assert!(p.expires_at() > p.created_at());
        p.start().unwrap();
        p.advance(40);
        p.advance(20);
        assert_eq!(p.progress(), 40);
        p.complete(vec![FileMetadata::file("pom.xml", 10)], "/tmp/x.zip".into())
            .unwrap();
        assert_eq!(p.status(), ProjectStatus::Completed);
        assert_eq!(p.progress(), 100);
        assert!(p.archive().is_some());
    }

    #[test]
    fn cannot_complete_from_pending_or_without_files() {
        let mut p = project();
        assert!(matches!(
            p.complete(vec![FileMetadata::file("a", 1)], "a.zip".into()),
            Err(DomainError::InvalidTransition { .. })
        ));
        p.start().unwrap();
        assert!(matches!(
            p.complete(vec![], "a.zip".into()),
            Err(DomainError::IncompleteProject { .. })
        ));
        assert_eq!(p.status(), ProjectStatus::Generating);
    }

    #[test]
    fn failed_is_terminal() {
        let mut p = project();
        p.start().unwrap();
        p.fail("generation failed during rendering").unwrap();
        assert_eq!(p.error(), Some("generation failed during rendering"));
        assert!(p.start().is_err());
        assert!(p.fail("again").is_err());
        assert!(p.archive().is_none());
    }

    #[test]
    fn rejects_non_positive_ttl() {
        assert!(GeneratedProject::new(
            Configuration::default(),
            PackId::new("demo").unwrap(),
            Utc::now(),
            Duration::zero()
        )
        .is_err());
    }

    #[test]
    fn expiry_boundary() {
        let p = project();
        assert!(!p.is_expired(p.created_at()));
        assert!(p.is_expired(p.expires_at()));
    }

    #[test]
    fn metadata_name_is_last_segment() {
        let f = FileMetadata::file("src/test/java/LoginTest.java", 5);
        assert_eq!(f.name, "LoginTest.java");
        let d = FileMetadata::directory("src");
        assert_eq!(d.name, "src");
        assert_eq!(d.size, None);
    }

    #[test]
    fn record_serializes_camel_case() {
        let json = serde_json::to_value(project()).unwrap();
        assert!(json.get("downloadCount").is_some());
        assert_eq!(json["status"], "pending");
    }
}
