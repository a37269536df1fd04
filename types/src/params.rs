//! Submitted request parameters.
//!
//! A submission is a tree: string leaves, lists (multi-valued fields such as
//! `tag_pks[]`), and nested maps (namespaced fields such as `album[title]`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ParamMap = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    List(Vec<ParamValue>),
    Map(ParamMap),
}

impl ParamValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            ParamValue::List(_) | ParamValue::Map(_) => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&ParamMap> {
        match self {
            ParamValue::Map(map) => Some(map),
            ParamValue::Str(_) | ParamValue::List(_) => None,
        }
    }

    /// Convert a JSON value into a parameter tree.
    ///
    /// Numbers and booleans are stringified the way a form post would carry
    /// them; `null` becomes the empty string.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::Str(String::new()),
            Value::Bool(b) => ParamValue::Str(b.to_string()),
            Value::Number(n) => ParamValue::Str(n.to_string()),
            Value::String(s) => ParamValue::Str(s.clone()),
            Value::Array(items) => ParamValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(obj) => ParamValue::Map(
                obj.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<ParamMap> for ParamValue {
    fn from(value: ParamMap) -> Self {
        ParamValue::Map(value)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(value: Vec<T>) -> Self {
        ParamValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Convert a JSON object into a top-level parameter map.
///
/// Returns `None` when the value is not an object.
#[must_use]
pub fn params_from_json(value: &Value) -> Option<ParamMap> {
    match ParamValue::from_json(value) {
        ParamValue::Map(map) => Some(map),
        ParamValue::Str(_) | ParamValue::List(_) => None,
    }
}
