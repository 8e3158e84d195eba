//! Handlebars template renderer.
//!
//! Runs in strict mode: a reference to a variable the context does not
//! define is an error, never an empty string. Output is not HTML-escaped.
//!
//! Helpers beyond the built-in `eq`, `ne`, `and`, `or`, `not`:
//!
//! | helper | example |
//! |--------|---------|
//! | `includes` | `{{#if (includes utilities "logger")}}` |
//! | `camelCase` | `{{camelCase "login flow"}}` → `loginFlow` |
//! | `pascalCase` | `{{pascalCase this}}` → `LoginFlow` |
//! | `kebabCase` | `{{kebabCase projectName}}` |
//! | `snakeCase` | `{{snakeCase this}}` |
//! | `upperCase` / `lowerCase` | `{{upperCase language}}` |

use ::handlebars::{Handlebars, handlebars_helper, no_escape};
use serde_json::Value;
use tracing::{instrument, trace};

use qaforge_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{
        Context,
        casing::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case},
        value_matches,
    },
    error::ForgeResult,
};

handlebars_helper!(includes: |haystack: Json, needle: Json| value_matches(haystack, needle));
handlebars_helper!(camel_case: |s: str| to_camel_case(s));
handlebars_helper!(pascal_case: |s: str| to_pascal_case(s));
handlebars_helper!(kebab_case: |s: str| to_kebab_case(s));
handlebars_helper!(snake_case: |s: str| to_snake_case(s));
handlebars_helper!(upper_case: |s: str| s.to_uppercase());
handlebars_helper!(lower_case: |s: str| s.to_lowercase());

/// Strict Handlebars renderer with the casing and membership helpers.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry.register_helper("includes", Box::new(includes));
        registry.register_helper("camelCase", Box::new(camel_case));
        registry.register_helper("pascalCase", Box::new(pascal_case));
        registry.register_helper("kebabCase", Box::new(kebab_case));
        registry.register_helper("snakeCase", Box::new(snake_case));
        registry.register_helper("upperCase", Box::new(upper_case));
        registry.register_helper("lowerCase", Box::new(lower_case));
        Self { registry }
    }

    /// Render against a raw JSON value instead of a [`Context`].
    pub fn render_value(&self, name: &str, template: &str, data: &Value) -> ForgeResult<String> {
        self.registry
            .render_template(template, data)
            .map_err(|e| {
                ApplicationError::RenderError {
                    path: name.to_string(),
                    reason: e.to_string(),
                }
                .into()
            })
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    #[instrument(skip(self, template, context))]
    fn render_str(&self, name: &str, template: &str, context: &Context) -> ForgeResult<String> {
        let out = self.render_value(name, template, context.value())?;
        trace!(bytes = out.len(), "Template expanded");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qaforge_core::domain::Configuration;
    use qaforge_core::error::ForgeError;
    use serde_json::json;

    fn context() -> Context {
        let config: Configuration = serde_json::from_value(json!({
            "testingType": "Web",
            "tool": "Selenium",
            "language": "Java",
            "testRunner": "JUnit",
            "buildTool": "Maven",
            "scenarios": ["Login", "checkout flow"],
            "config": { "groupId": "io.acme.qa" },
            "integrations": { "cicd": "Jenkins" },
            "utilities": ["logger"]
        }))
        .unwrap();
        Context::from_configuration(&config)
    }

    fn render(template: &str) -> ForgeResult<String> {
        HandlebarsRenderer::new().render_str("test.hbs", template, &context())
    }

    #[test]
    fn expands_variables_without_escaping() {
        assert_eq!(
            render("<groupId>{{groupId}}</groupId> & {{packagePath}}").unwrap(),
            "<groupId>io.acme.qa</groupId> & io/acme/qa"
        );
    }

    #[test]
    fn unknown_variable_is_render_error() {
        let err = render("{{doesNotExist}}").unwrap_err();
        match err {
            ForgeError::Application(ApplicationError::RenderError { path, .. }) => {
                assert_eq!(path, "test.hbs")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_template_is_render_error() {
        assert!(render("{{#if isMaven}}unclosed").is_err());
    }

    #[test]
    fn casing_helpers_over_scenarios() {
        let out = render("{{#each scenarios}}{{pascalCase this}}Test;{{/each}}").unwrap();
        assert_eq!(out, "LoginTest;CheckoutFlowTest;");
        assert_eq!(render("{{camelCase \"checkout flow\"}}").unwrap(), "checkoutFlow");
        assert_eq!(render("{{upperCase language}}").unwrap(), "JAVA");
    }

    #[test]
    fn includes_and_eq_drive_conditionals() {
        let out = render(
            "{{#if (includes utilities \"logger\")}}log{{/if}}\
             {{#if (includes utilities \"faker\")}}fake{{/if}}\
             {{#if (eq cicdTool \"Jenkins\")}}:jenkins{{/if}}\
             {{#if isMaven}}:mvn{{else}}:other{{/if}}",
        )
        .unwrap();
        assert_eq!(out, "log:jenkins:mvn");
    }

    #[test]
    fn absent_optional_value_renders_empty() {
        assert_eq!(render("[{{reportingTool}}]").unwrap(), "[]");
    }
}
