//! Test harness for running fixtures with stochastic variations

use crate::common::{TestCase, ExpectedError, Gen};
use arbor_core::{parse_str, Error, Map, Value};

/// Result of running a test
#[derive(Debug)]
pub struct TestResult {
    pub passed: bool,
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub seed: u64,
    pub errors: Vec<String>,
}

/// Convert a serde_json tree into ours.
pub fn from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            Value::Object(map.iter().map(|(k, v)| (k.clone(), from_json(v))).collect::<Map>())
        }
    }
}

/// Convert our tree into serde_json's.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Object(map) => serde_json::Value::Object(
            map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        ),
    }
}

/// Format an error as its code name, e.g. `TrailingComma`
fn error_name(err: &Error) -> String {
    if let Some(code) = err.lex_code() {
        format!("{:?}", code)
    } else if let Some(code) = err.parse_code() {
        format!("{:?}", code)
    } else {
        format!("Io({})", err)
    }
}

fn format_outcome(outcome: &Result<Value, Error>) -> String {
    match outcome {
        Ok(value) => format!("{}", value),
        Err(err) => match err.offset() {
            Some(offset) => format!("{} @ {}", error_name(err), offset),
            None => error_name(err),
        },
    }
}

fn format_expected(case: &TestCase, shift: usize) -> String {
    match (&case.json, &case.error) {
        (Some(json), _) => format!("{}", expected_value(case, json)),
        (None, Some(ExpectedError::At(code, offset))) => format!("{} @ {}", code, offset + shift),
        (None, Some(ExpectedError::Code(code))) => code.clone(),
        (None, None) => "<nothing>".to_string(),
    }
}

fn expected_value(case: &TestCase, json: &str) -> Value {
    let parsed: serde_json::Value = serde_json::from_str(json)
        .unwrap_or_else(|e| panic!("Fixture {} has invalid `json`: {}", case.id, e));
    from_json(&parsed)
}

/// Compare an outcome against the fixture's expectation. Error offsets are
/// expected to have moved by `shift` bytes.
fn check(case: &TestCase, outcome: &Result<Value, Error>, shift: usize) -> Vec<String> {
    let mut errors = Vec::new();
    match (&case.json, &case.error, outcome) {
        (Some(json), _, Ok(actual)) => {
            let expected = expected_value(case, json);
            if *actual != expected {
                errors.push(format!("Value mismatch: expected {}, got {}", expected, actual));
            }
        }
        (Some(_), _, Err(err)) => {
            errors.push(format!("Unexpected error: {}", err));
        }
        (None, Some(expected), Ok(actual)) => {
            errors.push(format!("Expected {} error, parsed {}", expected.code(), actual));
        }
        (None, Some(expected), Err(err)) => {
            let name = error_name(err);
            if name != expected.code() {
                errors.push(format!("Error code: expected {}, got {} ({})", expected.code(), name, err));
            }
            if let Some(offset) = expected.offset() {
                if err.offset() != Some(offset + shift) {
                    errors.push(format!(
                        "Error offset: expected {}, got {:?}",
                        offset + shift,
                        err.offset()
                    ));
                }
            }
            if err.location().is_none() {
                errors.push("Error has no location".to_string());
            }
        }
        (None, None, _) => errors.push("Fixture has neither `json` nor `error`".to_string()),
    }
    errors
}

/// Where the case's value sits inside a variation's document
enum Slot {
    Whole,
    Element(usize),
    Member(&'static str),
}

impl Slot {
    fn extract<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        match self {
            Slot::Whole => Some(doc),
            Slot::Element(index) => doc.at(*index),
            Slot::Member(key) => doc.get(key),
        }
    }
}

/// Run a single test case (canonical, no variations)
pub fn run_test(case: &TestCase) -> TestResult {
    let outcome = parse_str(&case.input);
    let errors = check(case, &outcome, 0);

    TestResult {
        passed: errors.is_empty(),
        input: case.input.clone(),
        expected: format_expected(case, 0),
        actual: format_outcome(&outcome),
        seed: 0,
        errors,
    }
}

/// Run test with stochastic variations
///
/// Failing cases only get leading whitespace, so every error offset moves by
/// the padding length. Passing cases may additionally be:
/// - 40% chance: embedded as an element of a generated list
/// - 40% chance: embedded as a member of a generated object
/// - padded with trailing whitespace
pub fn run_with_variations(case: &TestCase, gen: &mut Gen) -> TestResult {
    let lead = gen.whitespace();

    if case.error.is_some() {
        let input = format!("{}{}", lead, case.input);
        let outcome = parse_str(&input);
        let errors = check(case, &outcome, lead.len());
        return TestResult {
            passed: errors.is_empty(),
            input,
            expected: format_expected(case, lead.len()),
            actual: format_outcome(&outcome),
            seed: gen.seed,
            errors,
        };
    }

    let mut input = lead;
    let slot;

    if gen.chance(0.4) {
        let before = gen.geometric(0.5);
        let after = gen.geometric(0.5);
        input.push('[');
        for _ in 0..before {
            input.push_str(&gen.document(2).0);
            input.push(',');
            input.push_str(&gen.whitespace());
        }
        input.push_str(&case.input);
        for _ in 0..after {
            input.push(',');
            input.push_str(&gen.whitespace());
            input.push_str(&gen.document(2).0);
        }
        input.push(']');
        slot = Slot::Element(before);
    } else if gen.chance(0.4) {
        input.push('{');
        for _ in 0..gen.geometric(0.5) {
            input.push_str(&format!("\"{}\":{},", gen.key(), gen.document(2).0));
        }
        input.push_str("\"~case\"");
        input.push_str(&gen.whitespace());
        input.push(':');
        input.push_str(&case.input);
        input.push('}');
        slot = Slot::Member("~case");
    } else {
        input.push_str(&case.input);
        slot = Slot::Whole;
    }
    input.push_str(&gen.whitespace());

    let outcome = parse_str(&input);
    let errors = match &outcome {
        Ok(doc) => match slot.extract(doc) {
            Some(inner) => check(case, &Ok(inner.clone()), 0),
            None => vec![format!("Case value missing from wrapper {}", doc)],
        },
        Err(_) => check(case, &outcome, 0),
    };

    TestResult {
        passed: errors.is_empty(),
        input,
        expected: format_expected(case, 0),
        actual: format_outcome(&outcome),
        seed: gen.seed,
        errors,
    }
}

impl TestResult {
    /// Print detailed failure info
    pub fn print_failure(&self, case_id: &str) {
        eprintln!("\n=== FAILED: {} ===", case_id);
        eprintln!("Seed: {} (set ARBOR_TEST_SEED={} to reproduce)", self.seed, self.seed);
        eprintln!("\nInput:");
        eprintln!("{}", self.input);
        eprintln!("\nExpected: {}", self.expected);
        eprintln!("Actual:   {}", self.actual);
        eprintln!("\nErrors:");
        for e in &self.errors {
            eprintln!("  - {}", e);
        }
    }
}
