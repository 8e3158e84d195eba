//! Conditional file inclusion.
//!
//! A manifest entry's `conditional` object is parsed once, at manifest load,
//! into a [`Predicate`]: a conjunction of clauses, each a dotted context path
//! and an expectation. Evaluation only reads the frozen context value.
//!
//! Matching rules:
//! - strings compare ASCII case-insensitively
//! - an array in the context matches if any element matches (membership)
//! - an array in the conditional means "any of"
//! - a missing key or `null` never matches

use std::fmt;

use serde_json::{Map, Value};

use super::DomainError;
use super::context::{CONTEXT_KEYS, Context};
use super::manifest::FileEntry;

/// Dotted path into the context, e.g. `utilities.screenshots`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPath(Vec<String>);

impl ContextPath {
    pub fn parse(key: &str) -> Result<Self, DomainError> {
        let segments: Vec<String> = key.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(DomainError::InvalidConditional {
                key: key.to_string(),
                reason: "empty path segment".into(),
            });
        }
        if !CONTEXT_KEYS.contains(&segments[0].as_str()) {
            return Err(DomainError::InvalidConditional {
                key: key.to_string(),
                reason: format!("unknown context key '{}'", segments[0]),
            });
        }
        Ok(Self(segments))
    }

    pub fn root(&self) -> &str {
        &self.0[0]
    }

    /// Nested segments match keys ASCII case-insensitively, like values do.
    fn lookup<'a>(&self, context: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(context, |node, segment| {
            let object = node.as_object()?;
            object.get(segment).or_else(|| {
                object
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(segment))
                    .map(|(_, value)| value)
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Equals(Value),
    AnyOf(Vec<Value>),
}

impl Expectation {
    fn parse(key: &str, value: &Value) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidConditional {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match value {
            Value::String(_) | Value::Bool(_) | Value::Number(_) => Ok(Self::Equals(value.clone())),
            Value::Array(items) if items.is_empty() => Err(invalid("empty alternative list")),
            Value::Array(items) => {
                if items.iter().all(is_scalar) {
                    Ok(Self::AnyOf(items.clone()))
                } else {
                    Err(invalid("alternatives must be strings, numbers or booleans"))
                }
            }
            Value::Null => Err(invalid("null is not a valid expectation")),
            Value::Object(_) => Err(invalid("nested objects are not supported; use a dotted key")),
        }
    }

    fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Equals(expected) => value_matches(actual, expected),
            Self::AnyOf(options) => options.iter().any(|e| value_matches(actual, e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub path: ContextPath,
    pub expectation: Expectation,
}

/// Conjunction of clauses. Every clause must hold for the file to be emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn parse(conditional: &Map<String, Value>) -> Result<Self, DomainError> {
        let clauses = conditional
            .iter()
            .map(|(key, value)| {
                Ok(Clause {
                    path: ContextPath::parse(key)?,
                    expectation: Expectation::parse(key, value)?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        Ok(Self { clauses })
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn matches(&self, context: &Value) -> bool {
        self.clauses.iter().all(|clause| {
            match clause.path.lookup(context) {
                None | Some(Value::Null) => false,
                Some(actual) => clause.expectation.matches(actual),
            }
        })
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(v) => write!(f, "{v}"),
            Self::AnyOf(options) => {
                let options: Vec<String> = options.iter().map(Value::to_string).collect();
                write!(f, "any of [{}]", options.join(", "))
            }
        }
    }
}

/// `buildTool = "maven" and scenarios = "login"`
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{} = {}", clause.path, clause.expectation)?;
        }
        Ok(())
    }
}

/// Entries that belong in the output for `context`, in manifest order.
pub fn resolve<'a>(files: &'a [FileEntry], context: &Context) -> Vec<&'a FileEntry> {
    let value = context.value();
    files
        .iter()
        .filter(|entry| entry.conditional.as_ref().is_none_or(|p| p.matches(value)))
        .collect()
}

fn is_scalar(v: &Value) -> bool {
    matches!(v, Value::String(_) | Value::Bool(_) | Value::Number(_))
}

/// Whether a context value satisfies one expected scalar. Arrays match by
/// membership, flag objects by a key set to `true`.
pub fn value_matches(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| scalar_eq(item, expected)),
        // flag sets such as `utilities`: membership means a key set to true
        Value::Object(flags) => expected.as_str().is_some_and(|name| {
            flags
                .iter()
                .any(|(k, v)| k.eq_ignore_ascii_case(name) && v == &Value::Bool(true))
        }),
        other => scalar_eq(other, expected),
    }
}

fn scalar_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn predicate(v: Value) -> Predicate {
        Predicate::parse(v.as_object().unwrap()).unwrap()
    }

    fn ctx() -> Value {
        json!({
            "buildTool": "Maven",
            "cicdTool": null,
            "scenarios": ["Login", "Checkout"],
            "utilities": { "screenshots": true },
            "hasCicd": false
        })
    }

    #[test]
    fn predicate_display_lists_clauses() {
        let p = predicate(json!({"buildTool": "maven", "cicdTool": ["jenkins", "github"]}));
        assert_eq!(
            p.to_string(),
            r#"buildTool = "maven" and cicdTool = any of ["jenkins", "github"]"#
        );
    }

    #[test]
    fn string_match_ignores_case() {
        assert!(predicate(json!({"buildTool": "maven"})).matches(&ctx()));
        assert!(!predicate(json!({"buildTool": "gradle"})).matches(&ctx()));
    }

    #[test]
    fn null_and_missing_never_match() {
        assert!(!predicate(json!({"cicdTool": "jenkins"})).matches(&ctx()));
        assert!(!predicate(json!({"utilities.retry": true})).matches(&ctx()));
    }

    #[test]
    fn array_context_means_membership() {
        assert!(predicate(json!({"scenarios": "login"})).matches(&ctx()));
        assert!(!predicate(json!({"scenarios": "Search"})).matches(&ctx()));
    }

    #[test]
    fn array_expectation_means_any_of() {
        assert!(predicate(json!({"buildTool": ["gradle", "maven"]})).matches(&ctx()));
        assert!(!predicate(json!({"buildTool": ["gradle", "ant"]})).matches(&ctx()));
    }

    #[test]
    fn dotted_paths_and_booleans() {
        assert!(predicate(json!({"utilities.screenshots": true})).matches(&ctx()));
        assert!(predicate(json!({"hasCicd": false})).matches(&ctx()));
        assert!(!predicate(json!({"hasCicd": "false"})).matches(&ctx()));
    }

    #[test]
    fn flag_objects_match_by_name() {
        assert!(predicate(json!({"utilities": "Screenshots"})).matches(&ctx()));
        assert!(!predicate(json!({"utilities": "retry"})).matches(&ctx()));
    }

    #[test]
    fn dotted_and_membership_forms_agree_on_case() {
        let context = json!({ "utilities": { "Screenshots": true } });
        assert!(predicate(json!({"utilities.screenshots": true})).matches(&context));
        assert!(predicate(json!({"utilities": "screenshots"})).matches(&context));
    }

    #[test]
    fn mixed_case_utility_from_configuration() {
        use crate::domain::entities::configuration::Configuration;
        let config: Configuration = serde_json::from_str(
            r#"{"testingType":"Web","tool":"Selenium","language":"Java","testRunner":"JUnit",
                "utilities":["Screenshots"]}"#,
        )
        .unwrap();
        let context = Context::from_configuration(&config);
        let dotted = predicate(json!({"utilities.screenshots": true}));
        let membership = predicate(json!({"utilities": "screenshots"}));
        assert!(dotted.matches(context.value()));
        assert!(membership.matches(context.value()));
    }

    #[test]
    fn all_clauses_must_hold() {
        let p = predicate(json!({"buildTool": "maven", "scenarios": "Search"}));
        assert!(!p.matches(&ctx()));
    }

    #[test]
    fn parse_rejects_bad_conditionals() {
        let cases = [
            json!({"nope": "x"}),
            json!({"buildTool.": "x"}),
            json!({"buildTool": null}),
            json!({"buildTool": []}),
            json!({"buildTool": {"a": 1}}),
            json!({"buildTool": [["maven"]]}),
        ];
        for case in cases {
            assert!(
                matches!(
                    Predicate::parse(case.as_object().unwrap()),
                    Err(DomainError::InvalidConditional { .. })
                ),
                "{case} should be rejected"
            );
        }
    }
}
