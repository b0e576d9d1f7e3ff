//! Structured query keys.
//!
//! A key is an ordered list of JSON values such as `["users", 42, {"page": 1}]`.
//! Two representations matter to the detector:
//!
//! - the **hash**, a canonical string used for identity between snapshots;
//! - **partial matching**, used by exemption rules, where a pattern may be a
//!   shorter, compatible prefix of the key it is matched against.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Pattern element that matches any single key element at its position.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(Vec<Value>);

impl QueryKey {
    pub fn new(parts: Vec<Value>) -> Self {
        Self(parts)
    }

    pub fn parts(&self) -> &[Value] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Canonical hash of this key.
    ///
    /// Object members are emitted sorted by name, so keys that differ only in
    /// member order hash identically.
    pub fn hash(&self) -> String {
        hash_key(self)
    }

    /// Returns true when `pattern` is structurally compatible with this key.
    pub fn matches(
        &self,
        pattern: &QueryKey,
    ) -> bool {
        partial_match_key(self, pattern)
    }
}

impl From<Vec<Value>> for QueryKey {
    fn from(parts: Vec<Value>) -> Self {
        Self(parts)
    }
}

/// An array becomes the key's parts; any other value a single-part key.
impl From<Value> for QueryKey {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(parts) => Self(parts),
            other => Self(vec![other]),
        }
    }
}

impl From<Vec<&str>> for QueryKey {
    fn from(parts: Vec<&str>) -> Self {
        Self(parts.into_iter().map(Value::from).collect())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.hash())
    }
}

/// Builds a [`QueryKey`] from a list of elements in `serde_json::json!`
/// syntax: literals, objects, nested arrays or expressions.
///
/// ```
/// use waterfall_detector::query_key;
///
/// let page = 2;
/// let key = query_key!["users", -1, { "page": page }];
/// assert_eq!(key.hash(), r#"["users",-1,{"page":2}]"#);
/// ```
#[macro_export]
macro_rules! query_key {
    ($($part:tt)*) => {
        $crate::QueryKey::from($crate::__serde_json::json!([$($part)*]))
    };
}

pub fn hash_key(key: &QueryKey) -> String {
    // serde_json keeps object members in a sorted map unless the
    // `preserve_order` feature is enabled, which this crate never enables.
    serde_json::to_string(&key.0).unwrap_or_default()
}

/// Structured partial match of `pattern` against `key`.
///
/// The pattern matches when every element it specifies is compatible with
/// the element at the same position in the key. Extra trailing key elements
/// are ignored, so a shorter pattern acts as a prefix. Objects match member
/// by member on the members named in the pattern. [`WILDCARD`] matches any
/// single element.
pub fn partial_match_key(
    key: &QueryKey,
    pattern: &QueryKey,
) -> bool {
    if pattern.len() > key.len() {
        return false;
    }
    pattern
        .0
        .iter()
        .zip(key.0.iter())
        .all(|(p, k)| partial_match_value(k, p))
}

fn partial_match_value(
    value: &Value,
    pattern: &Value,
) -> bool {
    match (value, pattern) {
        (_, Value::String(p)) if p == WILDCARD => true,
        (Value::Array(values), Value::Array(patterns)) => {
            patterns.len() <= values.len()
                && patterns
                    .iter()
                    .zip(values.iter())
                    .all(|(p, v)| partial_match_value(v, p))
        }
        (Value::Object(values), Value::Object(patterns)) => patterns
            .iter()
            .all(|(name, p)| values.get(name).is_some_and(|v| partial_match_value(v, p))),
        (v, p) => v == p,
    }
}
