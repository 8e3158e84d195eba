//! Domain value objects: Tool, Language, TestRunner.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity. They
//! hold NO pack-mapping logic. Which pack serves which combination lives in
//! `catalog.rs`. This file defines the types, their canonical string forms
//! and their lenient `FromStr` parsers.
//!
//! The configuration carries these fields as free-form strings (a wizard
//! sends display labels such as `"JUnit"` or `"RestAssured"`); parsing into
//! the enums happens only when selecting a pack.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Add a `PackDef` in `catalog.rs` if a pack serves it

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lowercase and drop separators so `"Rest Assured"`, `"rest-assured"` and
/// `"RestAssured"` all compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '.'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── Tool ─────────────────────────────────────────────────────────────────────

/// A browser/API/mobile automation tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Selenium,
    Playwright,
    Cypress,
    RestAssured,
    Appium,
    WebdriverIo,
}

impl Tool {
    pub const ALL: &'static [Tool] = &[
        Self::Selenium,
        Self::Playwright,
        Self::Cypress,
        Self::RestAssured,
        Self::Appium,
        Self::WebdriverIo,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Selenium => "selenium",
            Self::Playwright => "playwright",
            Self::Cypress => "cypress",
            Self::RestAssured => "restassured",
            Self::Appium => "appium",
            Self::WebdriverIo => "webdriverio",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "selenium" | "seleniumwebdriver" => Ok(Self::Selenium),
            "playwright" => Ok(Self::Playwright),
            "cypress" => Ok(Self::Cypress),
            "restassured" => Ok(Self::RestAssured),
            "appium" => Ok(Self::Appium),
            "webdriverio" | "wdio" => Ok(Self::WebdriverIo),
            _ => Err(DomainError::InvalidConfiguration(format!(
                "unknown tool: {s}"
            ))),
        }
    }
}

// ── Language ─────────────────────────────────────────────────────────────────

/// Implementation language of the generated test project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Python,
    JavaScript,
    TypeScript,
    CSharp,
}

impl Language {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::CSharp => "csharp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "java" => Ok(Self::Java),
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" => Ok(Self::JavaScript),
            "typescript" | "ts" => Ok(Self::TypeScript),
            "c#" | "csharp" | "cs" => Ok(Self::CSharp),
            _ => Err(DomainError::InvalidConfiguration(format!(
                "unknown language: {s}"
            ))),
        }
    }
}

// ── TestRunner ───────────────────────────────────────────────────────────────

/// Test runner / framework executing the generated tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestRunner {
    JUnit5,
    TestNg,
    Pytest,
    Jest,
    Mocha,
    NUnit,
    PlaywrightTest,
}

impl TestRunner {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::JUnit5 => "junit5",
            Self::TestNg => "testng",
            Self::Pytest => "pytest",
            Self::Jest => "jest",
            Self::Mocha => "mocha",
            Self::NUnit => "nunit",
            Self::PlaywrightTest => "playwright-test",
        }
    }
}

impl fmt::Display for TestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestRunner {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "junit" | "junit5" | "jupiter" => Ok(Self::JUnit5),
            "testng" => Ok(Self::TestNg),
            "pytest" => Ok(Self::Pytest),
            "jest" => Ok(Self::Jest),
            "mocha" => Ok(Self::Mocha),
            "nunit" => Ok(Self::NUnit),
            "playwrighttest" | "playwrighttestrunner" => Ok(Self::PlaywrightTest),
            _ => Err(DomainError::InvalidConfiguration(format!(
                "unknown test runner: {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_parsing_ignores_case_and_separators() {
        assert_eq!("Selenium".parse::<Tool>().unwrap(), Tool::Selenium);
        assert_eq!("Rest Assured".parse::<Tool>().unwrap(), Tool::RestAssured);
        assert_eq!("rest-assured".parse::<Tool>().unwrap(), Tool::RestAssured);
        assert_eq!("WebdriverIO".parse::<Tool>().unwrap(), Tool::WebdriverIo);
        assert!("katalon".parse::<Tool>().is_err());
    }

    #[test]
    fn language_aliases() {
        assert_eq!("TS".parse::<Language>().unwrap(), Language::TypeScript);
        assert_eq!("C#".parse::<Language>().unwrap(), Language::CSharp);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn junit_means_junit5() {
        assert_eq!("JUnit".parse::<TestRunner>().unwrap(), TestRunner::JUnit5);
        assert_eq!("JUnit 5".parse::<TestRunner>().unwrap(), TestRunner::JUnit5);
        assert_eq!("TestNG".parse::<TestRunner>().unwrap(), TestRunner::TestNg);
        assert_eq!(
            "Playwright Test".parse::<TestRunner>().unwrap(),
            TestRunner::PlaywrightTest
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for tool in Tool::ALL {
            assert_eq!(tool.to_string().parse::<Tool>().unwrap(), *tool);
        }
    }
}
