//! Fixture loading from YAML files

use serde::Deserialize;

use std::path::Path;

/// A single test case from a fixture file
///
/// Exactly one of `json` and `error` is set. `json` holds the expected tree
/// written as JSON text so that `null` and numbers survive YAML untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub desc: String,
    pub input: String,
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub error: Option<ExpectedError>,
}

/// Expected failure - either a bare code name or [code name, offset]
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpectedError {
    /// Code only (e.g. `TrailingComma`)
    Code(String),
    /// Code plus the byte offset the error must point at
    At(String, usize),
}

impl ExpectedError {
    pub fn code(&self) -> &str {
        match self {
            ExpectedError::Code(code) => code,
            ExpectedError::At(code, _) => code,
        }
    }

    pub fn offset(&self) -> Option<usize> {
        match self {
            ExpectedError::Code(_) => None,
            ExpectedError::At(_, offset) => Some(*offset),
        }
    }
}

/// Load all test cases from a YAML fixture file
pub fn load_fixtures(path: &Path) -> Vec<TestCase> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));
    let cases: Vec<TestCase> = serde_yaml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e));
    for case in &cases {
        assert!(
            case.json.is_some() != case.error.is_some(),
            "Fixture {} in {:?} must set exactly one of `json` and `error`",
            case.id,
            path
        );
    }
    cases
}

/// Load fixtures from the standard fixtures directory
pub fn load_fixtures_by_name(name: &str) -> Vec<TestCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.yaml", name));
    load_fixtures(&path)
}
