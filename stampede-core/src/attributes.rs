//! Search attribute names and typed, fallible extraction
//!
//! The engine reports search attributes as a mapping of name to a list of
//! scalar values. [`SearchAttributes::normalize`] flattens that into one scalar
//! per name; the typed accessors return `Ok(None)` when an attribute is absent
//! and an [`AttributeError`] when it holds the wrong kind of value.

use crate::error::AttributeError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Tier (1..=5) of a priority-mode workflow
pub const PRIORITY: &str = "Priority";

/// Band key of a fairness-mode workflow
pub const FAIRNESS_KEY: &str = "FairnessKey";

/// Band weight of a fairness-mode workflow (0 when fairness is disabled)
pub const FAIRNESS_WEIGHT: &str = "FairnessWeight";

/// Progress marker: number of sequential steps the workflow has finished
pub const ACTIVITIES_COMPLETED: &str = "ActivitiesCompleted";

/// Flat name -> scalar view of an execution's search attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchAttributes(BTreeMap<String, Value>);

impl SearchAttributes {
    /// Flatten raw engine attributes: non-empty lists collapse to their first
    /// element, empty lists are dropped, anything else is kept as-is.
    pub fn normalize(raw: &BTreeMap<String, Value>) -> Self {
        let flat = raw
            .iter()
            .filter_map(|(name, value)| match value {
                Value::Array(items) => items.first().map(|first| (name.clone(), first.clone())),
                other => Some((name.clone(), other.clone())),
            })
            .collect();
        Self(flat)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Integer attribute. Integral floats and numeric strings are accepted,
    /// since engines report numeric attributes either way.
    pub fn int(&self, name: &str) -> Result<Option<i64>, AttributeError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(number)) => {
                if let Some(value) = number.as_i64() {
                    return Ok(Some(value));
                }
                match number.as_f64() {
                    Some(value) if value.is_finite() && value.fract() == 0.0 => {
                        Ok(Some(value as i64))
                    }
                    _ => Err(wrong_type(name, "integer", &Value::Number(number.clone()))),
                }
            }
            Some(Value::String(text)) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| wrong_type(name, "integer", &Value::String(text.clone()))),
            Some(other) => Err(wrong_type(name, "integer", other)),
        }
    }

    /// Attribute as text. Numbers and booleans are rendered as their JSON
    /// text; lists and objects are errors.
    pub fn text(&self, name: &str) -> Result<Option<String>, AttributeError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(scalar.to_string())),
            Some(other) => Err(wrong_type(name, "scalar", other)),
        }
    }
}

impl FromIterator<(String, Value)> for SearchAttributes {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn wrong_type(name: &str, expected: &'static str, found: &Value) -> AttributeError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    };
    AttributeError::WrongType {
        name: name.to_string(),
        expected,
        found: found.to_string(),
    }
}
