//! User selections: long selection key to an ordered set of selected values

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::{MogrifyError, Result};

/// Read access to selections.
///
/// The evaluator only ever looks keys up through this trait, so callers can
/// supply their own store.
pub trait SelectionLookup {
    /// Selected values for a key, or `None` when the key was never selected
    fn lookup(&self, key: &str) -> Option<&[String]>;

    /// Whether a key is present and its values reduce to true
    fn is_set(&self, key: &str) -> bool {
        self.lookup(key).is_some_and(reduces_to_true)
    }
}

/// Whether a single selected value reads as true
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !["false", "0", "no", "off", "none", "null"]
            .iter()
            .any(|falsy| value.eq_ignore_ascii_case(falsy))
}

/// A multi-value selection is true iff any element is truthy
pub fn reduces_to_true(values: &[String]) -> bool {
    values.iter().any(|v| is_truthy(v))
}

/// In-memory selections map
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    values: HashMap<String, Vec<String>>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values for a key. Empty value lists are ignored, since a
    /// selection is never empty.
    pub fn insert<I, S>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            warn!(key = %key, "ignoring empty selection");
            return;
        }
        self.values.insert(key, values);
    }

    /// Builder form of [`Selections::insert`]
    pub fn with<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(key, values);
        self
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse selections from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    /// Parse selections from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MogrifyError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Convert a JSON object into selections.
    ///
    /// Values may be strings, booleans, numbers, or arrays of those. Scalars
    /// become one-element lists; nulls and empty arrays are dropped.
    pub fn from_json_value(value: &JsonValue) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            MogrifyError::InvalidSelections("expected a JSON object at the top level".to_string())
        })?;

        let mut selections = Self::new();
        for (key, raw) in obj {
            let values: Vec<String> = match raw {
                JsonValue::Array(items) => items
                    .iter()
                    .map(|item| scalar_to_string(key, item))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .flatten()
                    .collect(),
                other => scalar_to_string(key, other)?.into_iter().collect(),
            };
            selections.insert(key.clone(), values);
        }
        Ok(selections)
    }
}

fn scalar_to_string(key: &str, value: &JsonValue) -> Result<Option<String>> {
    match value {
        JsonValue::String(s) => Ok(Some(s.clone())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Null => Ok(None),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(MogrifyError::InvalidSelections(
            format!("value for {key:?} must be a scalar or an array of scalars"),
        )),
    }
}

impl SelectionLookup for Selections {
    fn lookup(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }
}

impl SelectionLookup for HashMap<String, Vec<String>> {
    fn lookup(&self, key: &str) -> Option<&[String]> {
        self.get(key).filter(|v| !v.is_empty()).map(Vec::as_slice)
    }
}
