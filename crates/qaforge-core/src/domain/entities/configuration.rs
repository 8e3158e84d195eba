//! The generation request.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use super::DomainError;

/// Declarative description of the project to generate.
///
/// Field values are kept as submitted (e.g. `"JUnit"`, `"Maven"`); matching
/// against packs and conditionals is case-insensitive. Immutable once handed
/// to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub testing_type: String,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub tool: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub build_tool: Option<String>,
    #[serde(default)]
    pub test_runner: String,
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub config: ProjectSettings,
    #[serde(default)]
    pub integrations: Integrations,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Accepts either `["screenshots", "logger"]` or `{"screenshots": true}`.
    #[serde(default, deserialize_with = "utilities_from_list_or_flags")]
    pub utilities: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integrations {
    #[serde(default)]
    pub cicd: Option<String>,
    #[serde(default)]
    pub reporting: Option<String>,
    #[serde(default)]
    pub others: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UtilitiesRepr {
    List(Vec<String>),
    Flags(BTreeMap<String, bool>),
}

fn utilities_from_list_or_flags<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match UtilitiesRepr::deserialize(deserializer)? {
        UtilitiesRepr::List(items) => items.into_iter().collect(),
        UtilitiesRepr::Flags(flags) => flags
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect(),
    })
}

impl Configuration {
    /// Check everything that can be checked without a pack.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("testingType", &self.testing_type),
            ("tool", &self.tool),
            ("language", &self.language),
            ("testRunner", &self.test_runner),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::MissingRequiredField { field });
            }
        }

        if let Some(group) = non_blank(&self.config.group_id) {
            validate_dotted_identifier("config.groupId", group)?;
        }
        if let Some(package) = non_blank(&self.config.package_name) {
            validate_dotted_identifier("config.packageName", package)?;
        }
        if let Some(artifact) = non_blank(&self.config.artifact_id) {
            if !artifact
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            {
                return Err(DomainError::InvalidConfiguration(format!(
                    "config.artifactId '{artifact}' may only contain letters, digits, '-', '_' and '.'"
                )));
            }
        }
        if let Some(name) = &self.config.project_name {
            if name.chars().any(char::is_control) || name.chars().count() > 128 {
                return Err(DomainError::InvalidConfiguration(
                    "config.projectName must be printable and at most 128 characters".into(),
                ));
            }
        }

        if let Some(blank) = self.scenarios.iter().position(|s| s.trim().is_empty()) {
            return Err(DomainError::InvalidConfiguration(format!(
                "scenarios[{blank}] is empty"
            )));
        }

        Ok(())
    }
}

/// `Some` only for values with visible content.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `com.example.tests`: non-empty segments, each a Java-style identifier.
fn validate_dotted_identifier(field: &str, value: &str) -> Result<(), DomainError> {
    let valid = value.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    });
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidConfiguration(format!(
            "{field} '{value}' must be dot-separated identifiers (e.g. com.example.tests)"
        )))
    }
}
