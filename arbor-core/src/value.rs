//! Parsed value tree.
//!
//! A [`Value`] is a closed variant: the kind and the payload cannot
//! disagree. Composites own their children exclusively, so a tree is
//! released recursively when its root is dropped.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::Error;

/// Object payload. Keys keep document order; a repeated key overwrites the
/// earlier value in place.
pub type Map = IndexMap<String, Value>;

/// A node in the parsed tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `{"key": value, ...}`
    Object(Map),

    /// `[value, ...]`
    List(Vec<Value>),

    /// Escape-decoded string.
    String(String),

    /// Any number, widened to `f64`.
    Number(f64),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    #[default]
    Null,
}

/// Kind tag of a [`Value`], for diagnostics and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Object,
    List,
    String,
    Number,
    Boolean,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Object => "object",
            ValueKind::List => "list",
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Null => "null",
        })
    }
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Object(_) => ValueKind::Object,
            Value::List(_) => ValueKind::List,
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Null => ValueKind::Null,
        }
    }

    /// Check if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as a float.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get as an integer.
    ///
    /// Only succeeds when the number is integral and within the range where
    /// `f64` represents every integer exactly (±2^53).
    pub fn as_i64(&self) -> Option<i64> {
        const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= EXACT => Some(*n as i64),
            _ => None,
        }
    }

    /// Try to get as string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as list.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as object.
    #[inline]
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Element `index` if this is a list.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Number of direct children; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Object(map) => map.len(),
            Value::List(items) => items.len(),
            _ => 0,
        }
    }

    /// Check if this has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth: scalars are 0, a composite is one more than its
    /// deepest child (`[]` and `{}` are 1).
    pub fn depth(&self) -> usize {
        match self {
            Value::Object(map) => 1 + map.values().map(Value::depth).max().unwrap_or(0),
            Value::List(items) => 1 + items.iter().map(Value::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().collect())
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse_str(s)
    }
}

// ============================================================================
// Debug rendering
// ============================================================================

/// Renders compact text with `{}` and indented text with `{:#}`.
///
/// Output re-parses to an equal tree. Non-finite numbers (which the parser
/// never produces) render as `null`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = f.alternate();
        render(self, f, pretty, 0)
    }
}

fn render(value: &Value, f: &mut fmt::Formatter<'_>, pretty: bool, level: usize) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Number(n) if n.is_finite() => render_number(*n, f),
        Value::Number(_) => f.write_str("null"),
        Value::String(s) => render_str(s, f),
        Value::List(items) => {
            if items.is_empty() {
                return f.write_str("[]");
            }
            f.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                newline(f, pretty, level + 1)?;
                render(item, f, pretty, level + 1)?;
            }
            newline(f, pretty, level)?;
            f.write_char(']')
        }
        Value::Object(map) => {
            if map.is_empty() {
                return f.write_str("{}");
            }
            f.write_char('{')?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_char(',')?;
                }
                newline(f, pretty, level + 1)?;
                render_str(key, f)?;
                f.write_str(if pretty { ": " } else { ":" })?;
                render(item, f, pretty, level + 1)?;
            }
            newline(f, pretty, level)?;
            f.write_char('}')
        }
    }
}

fn newline(f: &mut fmt::Formatter<'_>, pretty: bool, level: usize) -> fmt::Result {
    if pretty {
        f.write_char('\n')?;
        for _ in 0..level {
            f.write_str("  ")?;
        }
    }
    Ok(())
}

/// Plain decimal for everyday magnitudes, exponent form outside them.
fn render_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let magnitude = n.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-6) {
        write!(f, "{:e}", n)
    } else {
        write!(f, "{}", n)
    }
}

fn render_str(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{08}' => f.write_str("\\b")?,
            '\u{0C}' => f.write_str("\\f")?,
            c if c < '\u{20}' => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

// ============================================================================
// Serde
// ============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, item) in map {
                    out.serialize_entry(key, item)?;
                }
                out.end()
            }
        }
    }
}
