use super::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A normalized, `/`-separated path guaranteed to stay inside its root.
///
/// Invariant: non-empty, no `..` segment, no root/drive prefix, no null byte,
/// no `.` or empty segments. Enforced at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    /// Normalize `raw` and reject anything that could escape the root.
    ///
    /// `\` is treated as a separator, `.` and empty segments are dropped.
    pub fn sanitize(raw: &str) -> Result<Self, DomainError> {
        if raw.contains('\0') {
            return Err(DomainError::traversal(raw, "null byte"));
        }

        let unified = raw.replace('\\', "/");
        if unified.starts_with('/') {
            return Err(DomainError::traversal(raw, "absolute path"));
        }
        if has_drive_prefix(&unified) {
            return Err(DomainError::traversal(raw, "drive prefix"));
        }

        let mut segments = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => continue,
                ".." => return Err(DomainError::traversal(raw, "parent segment")),
                s => segments.push(s),
            }
        }

        if segments.is_empty() {
            return Err(DomainError::traversal(raw, "empty path"));
        }

        Ok(Self(segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Last segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Remove a trailing suffix such as `.hbs`, keeping the result valid.
    pub fn strip_suffix(&self, suffix: &str) -> Self {
        match self.0.strip_suffix(suffix) {
            Some(rest) if !rest.is_empty() && !rest.ends_with('/') => Self(rest.to_string()),
            _ => self.clone(),
        }
    }
}

fn has_drive_prefix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl TryFrom<String> for RelativePath {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::sanitize(&value)
    }
}

impl From<RelativePath> for String {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix permission bits for a generated file, written as an octal string
/// (`"0755"`) in manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileMode(u32);

impl FileMode {
    pub const REGULAR: Self = Self(0o644);
    pub const EXECUTABLE: Self = Self(0o755);

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let digits = s.trim();
        if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return Err(DomainError::InvalidConfiguration(format!(
                "file mode must be an octal string like \"0755\", got {s:?}"
            )));
        }
        u32::from_str_radix(digits, 8)
            .map(Self)
            .map_err(|e| DomainError::InvalidConfiguration(format!("file mode {s:?}: {e}")))
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_executable(self) -> bool {
        self.0 & 0o111 != 0
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::REGULAR
    }
}

impl TryFrom<String> for FileMode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FileMode> for String {
    fn from(mode: FileMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_dot_segments() {
        let p = RelativePath::sanitize(r"src\test\.\java//LoginTest.java").unwrap();
        assert_eq!(p.as_str(), "src/test/java/LoginTest.java");
        assert_eq!(p.file_name(), "LoginTest.java");
    }

    #[test]
    fn rejects_escapes() {
        for raw in [
            "../../evil.txt",
            "src/../../evil.txt",
            "/etc/passwd",
            r"\\server\share",
            "C:/Windows/evil.dll",
            "c:evil",
            "bad\0name",
            "",
            "./.",
        ] {
            assert!(
                matches!(
                    RelativePath::sanitize(raw),
                    Err(DomainError::PathTraversalRejected { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn dots_inside_names_are_fine() {
        assert!(RelativePath::sanitize("..hidden/file..txt").is_ok());
    }

    #[test]
    fn strip_hbs_suffix() {
        let p = RelativePath::sanitize("pom.xml.hbs").unwrap();
        assert_eq!(p.strip_suffix(".hbs").as_str(), "pom.xml");
        let bare = RelativePath::sanitize(".hbs").unwrap();
        assert_eq!(bare.strip_suffix(".hbs").as_str(), ".hbs");
    }

    #[test]
    fn file_mode_parsing() {
        assert_eq!(FileMode::parse("0755").unwrap(), FileMode::EXECUTABLE);
        assert_eq!(FileMode::parse("644").unwrap().bits(), 0o644);
        assert!(FileMode::parse("0755").unwrap().is_executable());
        assert!(!FileMode::REGULAR.is_executable());
        assert!(FileMode::parse("0855").is_err());
        assert!(FileMode::parse("rwx").is_err());
        assert!(FileMode::parse("07777").is_err());
        assert_eq!(FileMode::EXECUTABLE.to_string(), "0755");
    }
}
