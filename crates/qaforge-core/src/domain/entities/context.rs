//! Rendering context derived from a [`Configuration`].
//!
//! Built once per generation and frozen into a `serde_json::Value`; both the
//! conditional resolver and the template renderer read that same value.
//! Every key listed in [`CONTEXT_KEYS`] is always present; absent optional
//! values are `null`.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;

use super::configuration::{Configuration, non_blank};
use crate::domain::casing::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};

pub const DEFAULT_PROJECT_NAME: &str = "test-automation";
pub const DEFAULT_GROUP_ID: &str = "com.example";

/// Root keys a conditional may address.
pub const CONTEXT_KEYS: &[&str] = &[
    "testingType",
    "methodology",
    "tool",
    "language",
    "buildTool",
    "testRunner",
    "scenarios",
    "dependencies",
    "utilities",
    "projectName",
    "groupId",
    "artifactId",
    "packageName",
    "packagePath",
    "projectNameCamel",
    "projectNamePascal",
    "projectNameKebab",
    "projectNameSnake",
    "cicdTool",
    "reportingTool",
    "otherIntegrations",
    "hasCicd",
    "hasReporting",
    "isWeb",
    "isApi",
    "isMobile",
    "isMaven",
    "isGradle",
    "isBdd",
    "generatorVersion",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextData<'a> {
    testing_type: &'a str,
    methodology: Option<&'a str>,
    tool: &'a str,
    language: &'a str,
    build_tool: Option<&'a str>,
    test_runner: &'a str,
    scenarios: &'a [String],
    dependencies: &'a [String],
    utilities: BTreeMap<String, bool>,
    project_name: String,
    group_id: String,
    artifact_id: String,
    package_name: String,
    package_path: String,
    project_name_camel: String,
    project_name_pascal: String,
    project_name_kebab: String,
    project_name_snake: String,
    cicd_tool: Option<&'a str>,
    reporting_tool: Option<&'a str>,
    other_integrations: &'a [String],
    has_cicd: bool,
    has_reporting: bool,
    is_web: bool,
    is_api: bool,
    is_mobile: bool,
    is_maven: bool,
    is_gradle: bool,
    is_bdd: bool,
    generator_version: &'static str,
}

/// Immutable name/value bindings for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    value: Value,
}

impl Context {
    /// Derive the context. `project_name`, `group_id`, `artifact_id` and
    /// `package_name` fall back to defaults so path templates always expand.
    pub fn from_configuration(config: &Configuration) -> Self {
        let settings = &config.config;
        let project_name = non_blank(&settings.project_name)
            .unwrap_or(DEFAULT_PROJECT_NAME)
            .to_string();
        let group_id = non_blank(&settings.group_id)
            .unwrap_or(DEFAULT_GROUP_ID)
            .to_string();
        let artifact_id = non_blank(&settings.artifact_id)
            .map(str::to_string)
            .unwrap_or_else(|| to_kebab_case(&project_name));
        let package_name = non_blank(&settings.package_name)
            .unwrap_or(group_id.as_str())
            .to_string();

        let testing_type = Some(config.testing_type.as_str());
        let is = |value: Option<&str>, expected: &str| {
            value.is_some_and(|v| v.trim().eq_ignore_ascii_case(expected))
        };
        let build_tool = non_blank(&config.build_tool);
        let methodology = non_blank(&config.methodology);
        let cicd_tool = non_blank(&config.integrations.cicd);
        let reporting_tool = non_blank(&config.integrations.reporting);

        let data = ContextData {
            testing_type: &config.testing_type,
            methodology,
            tool: &config.tool,
            language: &config.language,
            build_tool,
            test_runner: &config.test_runner,
            scenarios: &config.scenarios,
            dependencies: &config.dependencies,
            utilities: config
                .utilities
                .iter()
                .map(|u| (u.trim().to_ascii_lowercase(), true))
                .collect(),
            package_path: package_name.replace('.', "/"),
            project_name_camel: to_camel_case(&project_name),
            project_name_pascal: to_pascal_case(&project_name),
            project_name_kebab: to_kebab_case(&project_name),
            project_name_snake: to_snake_case(&project_name),
            project_name,
            group_id,
            artifact_id,
            package_name,
            cicd_tool,
            reporting_tool,
            other_integrations: &config.integrations.others,
            has_cicd: cicd_tool.is_some(),
            has_reporting: reporting_tool.is_some(),
            is_web: is(testing_type, "web") || is(testing_type, "ui"),
            is_api: is(testing_type, "api"),
            is_mobile: is(testing_type, "mobile"),
            is_maven: is(build_tool, "maven"),
            is_gradle: is(build_tool, "gradle"),
            is_bdd: is(methodology, "bdd"),
            generator_version: crate::VERSION,
        };

        // Serializing plain strings, bools and maps with string keys is infallible.
        let value = serde_json::to_value(&data).unwrap_or(Value::Null);
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Look up a dotted path, e.g. `utilities.screenshots`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.value, |node, segment| node.as_object()?.get(segment))
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
