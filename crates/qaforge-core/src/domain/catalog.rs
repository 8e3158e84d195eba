//! Pack catalog: which pack serves which (tool, language, runner) combination.
//!
//! # Design
//!
//! A single static registry. Each shipped pack is described exactly once by a
//! [`PackDef`] keyed by a typed [`PackKey`]. Lookups are table scans over a
//! handful of entries.
//!
//! Unmapped combinations never resolve silently: [`select_pack`] returns
//! [`PackSelection::Fallback`], naming both the requested combination and the
//! pack that will serve it. The caller decides whether a fallback is
//! acceptable (see `PackRegistry::resolve_pack_id`).
//!
//! # Adding a New Pack
//!
//! 1. Create `packs/<id>/manifest.json` and its `files/`
//! 2. Add one [`PackDef`] entry to [`PACK_REGISTRY`]

use std::fmt;

use crate::domain::entities::manifest::PackId;
use crate::domain::value_objects::{Language, TestRunner, Tool};

/// Pack used for every combination without a registry entry.
pub const FALLBACK_PACK: &str = "selenium-java-testng";

/// Typed lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackKey {
    pub tool: Tool,
    pub language: Language,
    pub runner: TestRunner,
}

impl PackKey {
    pub const fn new(tool: Tool, language: Language, runner: TestRunner) -> Self {
        Self {
            tool,
            language,
            runner,
        }
    }
}

impl fmt::Display for PackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tool, self.language, self.runner)
    }
}

/// One shipped pack and the combination it serves.
#[derive(Debug, Clone, Copy)]
pub struct PackDef {
    pub key: PackKey,
    /// Directory name under the packs root.
    pub pack: &'static str,
    pub description: &'static str,
}

/// Single source of truth for combination → pack mapping.
pub static PACK_REGISTRY: &[PackDef] = &[
    PackDef {
        key: PackKey::new(Tool::Selenium, Language::Java, TestRunner::JUnit5),
        pack: "selenium-java-junit5",
        description: "Selenium WebDriver with Java and JUnit 5",
    },
    PackDef {
        key: PackKey::new(Tool::Selenium, Language::Java, TestRunner::TestNg),
        pack: "selenium-java-testng",
        description: "Selenium WebDriver with Java and TestNG",
    },
    PackDef {
        key: PackKey::new(
            Tool::Playwright,
            Language::TypeScript,
            TestRunner::PlaywrightTest,
        ),
        pack: "playwright-typescript",
        description: "Playwright with TypeScript and the Playwright test runner",
    },
    PackDef {
        key: PackKey::new(Tool::RestAssured, Language::Java, TestRunner::TestNg),
        pack: "restassured-java-testng",
        description: "REST Assured API tests with Java and TestNG",
    },
];

/// Outcome of mapping a configuration onto a pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackSelection {
    /// The combination has a dedicated pack.
    Mapped(PackId),
    /// No dedicated pack; `pack` is the named fallback.
    Fallback { requested: String, pack: PackId },
}

impl PackSelection {
    pub fn pack_id(&self) -> &PackId {
        match self {
            Self::Mapped(id) | Self::Fallback { pack: id, .. } => id,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

pub fn find_pack(key: PackKey) -> Option<&'static PackDef> {
    PACK_REGISTRY.iter().find(|def| def.key == key)
}

pub fn find_pack_by_id(id: &str) -> Option<&'static PackDef> {
    PACK_REGISTRY.iter().find(|def| def.pack == id)
}

/// Map the configuration's free-form tool/language/runner strings to a pack.
///
/// Strings that do not parse into a known enum variant are treated exactly
/// like a parsed-but-unmapped combination.
pub fn select_pack(tool: &str, language: &str, runner: &str) -> PackSelection {
    let key = match (tool.parse(), language.parse(), runner.parse()) {
        (Ok(tool), Ok(language), Ok(runner)) => Some(PackKey::new(tool, language, runner)),
        _ => None,
    };

    match key.and_then(find_pack) {
        Some(def) => PackSelection::Mapped(PackId::from_static(def.pack)),
        None => PackSelection::Fallback {
            requested: format!("{tool}/{language}/{runner}"),
            pack: PackId::from_static(FALLBACK_PACK),
        },
    }
}

// ── Registry integrity (checked in tests) ────────────────────────────────────

/// Assert that the registry is internally consistent.
///
/// Panics with a clear message on any violation.
#[doc(hidden)]
pub fn assert_registry_integrity() {
    for (i, def) in PACK_REGISTRY.iter().enumerate() {
        assert!(
            PackId::new(def.pack).is_ok(),
            "Pack {:?} is not a valid pack id",
            def.pack
        );

        let dup = PACK_REGISTRY[i + 1..].iter().find(|d| d.key == def.key);
        assert!(
            dup.is_none(),
            "Combination {} registered twice ({} and {:?})",
            def.key,
            def.pack,
            dup.map(|d| d.pack)
        );
    }

    assert!(
        find_pack_by_id(FALLBACK_PACK).is_some(),
        "Fallback pack {FALLBACK_PACK} is not registered"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_internally_consistent() {
        assert_registry_integrity();
    }

    #[test]
    fn selenium_java_junit_maps_to_junit5_pack() {
        let sel = select_pack("Selenium", "Java", "JUnit");
        assert_eq!(sel, PackSelection::Mapped(PackId::from_static("selenium-java-junit5")));
        assert!(!sel.is_fallback());
    }

    #[test]
    fn playwright_typescript_is_mapped() {
        let sel = select_pack("Playwright", "TypeScript", "Playwright Test");
        assert_eq!(sel.pack_id().as_str(), "playwright-typescript");
    }

    #[test]
    fn unmapped_combination_is_named_fallback() {
        let sel = select_pack("Cypress", "JavaScript", "Mocha");
        match sel {
            PackSelection::Fallback { requested, pack } => {
                assert_eq!(requested, "Cypress/JavaScript/Mocha");
                assert_eq!(pack.as_str(), FALLBACK_PACK);
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_values_fall_back() {
        let sel = select_pack("Katalon", "Groovy", "Spock");
        assert!(sel.is_fallback());
        assert_eq!(sel.pack_id().as_str(), FALLBACK_PACK);
    }
}
