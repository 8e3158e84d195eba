//! Pack manifests.
//!
//! A manifest is parsed in two steps: `serde` reads the raw document with
//! every field optional, then [`Manifest::parse`] checks required fields and
//! turns strings into validated types (paths, modes, predicates). Missing
//! fields therefore surface as `ManifestInvalid` with the pack name instead of
//! a bare deserializer message.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::DomainError;
use super::common::{FileMode, RelativePath};
use super::conditional::Predicate;

// ── PackId ───────────────────────────────────────────────────────────────────

/// Identifier of a pack; also its directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackId(String);

impl PackId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id.len() <= 64
            && id.as_bytes()[0].is_ascii_alphanumeric()
            && id
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'-' | b'_' | b'.'));
        if valid {
            Ok(Self(id))
        } else {
            Err(DomainError::InvalidConfiguration(format!(
                "invalid pack id {id:?}: use lowercase letters, digits, '-', '_' or '.'"
            )))
        }
    }

    /// Catalog constants; validated by the catalog integrity test.
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PackId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PackId> for String {
    fn from(id: PackId) -> Self {
        id.0
    }
}

impl fmt::Display for PackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── PackVersion ──────────────────────────────────────────────────────────────

/// Strict `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl PackVersion {
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let mut next = || {
            parts
                .next()
                .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|p| p.parse::<u64>().ok())
        };
        let version = Self {
            major: next()?,
            minor: next()?,
            patch: next()?,
        };
        parts.next().is_none().then_some(version)
    }
}

impl fmt::Display for PackVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ── Manifest ─────────────────────────────────────────────────────────────────

/// One file a pack may contribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub path: RelativePath,
    pub is_template: bool,
    pub conditional: Option<Predicate>,
    pub mode: Option<FileMode>,
}

impl FileEntry {
    pub fn new(path: RelativePath, is_template: bool) -> Self {
        Self {
            path,
            is_template,
            conditional: None,
            mode: None,
        }
    }

    pub fn with_conditional(mut self, predicate: Predicate) -> Self {
        self.conditional = Some(predicate);
        self
    }

    pub fn with_mode(mut self, mode: FileMode) -> Self {
        self.mode = Some(mode);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub id: PackId,
    pub version: PackVersion,
    pub description: Option<String>,
    pub files: Vec<FileEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestDocument {
    id: Option<String>,
    version: Option<String>,
    description: Option<String>,
    files: Option<Vec<FileEntryDocument>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntryDocument {
    path: Option<String>,
    is_template: Option<bool>,
    conditional: Option<Map<String, Value>>,
    mode: Option<String>,
}

impl Manifest {
    /// Parse and validate `manifest.json` bytes for the pack stored under
    /// directory `expected`.
    pub fn parse(expected: &PackId, bytes: &[u8]) -> Result<Self, DomainError> {
        let doc: ManifestDocument = serde_json::from_slice(bytes)
            .map_err(|e| DomainError::manifest(expected.as_str(), format!("malformed JSON: {e}")))?;

        let invalid = |reason: String| DomainError::manifest(expected.as_str(), reason);

        let id = doc.id.ok_or_else(|| invalid("missing field 'id'".into()))?;
        if id != expected.as_str() {
            return Err(invalid(format!(
                "id '{id}' does not match pack directory '{expected}'"
            )));
        }

        let raw_version = doc
            .version
            .ok_or_else(|| invalid("missing field 'version'".into()))?;
        let version = PackVersion::parse(&raw_version).ok_or_else(|| {
            invalid(format!("version '{raw_version}' is not of the form x.y.z"))
        })?;

        let docs = doc.files.ok_or_else(|| invalid("missing field 'files'".into()))?;
        if docs.is_empty() {
            return Err(invalid("manifest lists no files".into()));
        }

        let mut seen = HashSet::new();
        let mut files = Vec::with_capacity(docs.len());
        for (i, entry) in docs.into_iter().enumerate() {
            let raw_path = entry
                .path
                .ok_or_else(|| invalid(format!("files[{i}]: missing field 'path'")))?;
            let path = RelativePath::sanitize(&raw_path)
                .map_err(|e| invalid(format!("files[{i}]: {e}")))?;
            let is_template = entry
                .is_template
                .ok_or_else(|| invalid(format!("files[{i}] ({path}): missing field 'isTemplate'")))?;

            if !seen.insert(path.clone()) {
                return Err(invalid(format!("files[{i}]: duplicate path '{path}'")));
            }

            let conditional = entry
                .conditional
                .map(|map| Predicate::parse(&map))
                .transpose()
                .map_err(|e| invalid(format!("files[{i}] ({path}): {e}")))?;

            let mode = entry
                .mode
                .as_deref()
                .map(FileMode::parse)
                .transpose()
                .map_err(|e| invalid(format!("files[{i}] ({path}): {e}")))?;

            files.push(FileEntry {
                path,
                is_template,
                conditional,
                mode,
            });
        }

        Ok(Self {
            id: expected.clone(),
            version,
            description: doc.description,
            files,
        })
    }
}

// ── Pack ─────────────────────────────────────────────────────────────────────

/// A validated manifest together with the raw bytes of every listed file.
#[derive(Debug, Clone)]
pub struct Pack {
    manifest: Manifest,
    contents: HashMap<RelativePath, Vec<u8>>,
}

impl Pack {
    /// Fails if any manifest entry has no content.
    pub fn new(
        manifest: Manifest,
        contents: HashMap<RelativePath, Vec<u8>>,
    ) -> Result<Self, DomainError> {
        if let Some(missing) = manifest.files.iter().find(|f| !contents.contains_key(&f.path)) {
            return Err(DomainError::manifest(
                manifest.id.as_str(),
                format!("listed file '{}' is missing from the pack", missing.path),
            ));
        }
        Ok(Self { manifest, contents })
    }

    pub fn id(&self) -> &PackId {
        &self.manifest.id
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn content(&self, path: &RelativePath) -> Option<&[u8]> {
        self.contents.get(path).map(Vec::as_slice)
    }
}
