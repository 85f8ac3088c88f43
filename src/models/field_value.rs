use serde::{Deserialize, Serialize};

/// Value stored under a single form field name.
///
/// The first occurrence of a name is stored as `One`; a repeated name is
/// promoted to `Many` and never demoted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// Add another occurrence, promoting a single value to a sequence.
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = FieldValue::Many(vec![first, value]);
            }
            FieldValue::Many(values) => values.push(value),
        }
    }

    /// All values in arrival order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            FieldValue::One(v) => vec![v.as_str()],
            FieldValue::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, FieldValue::Many(_))
    }

    /// Comma-joined rendering used for terminal output.
    pub fn to_csv(&self) -> String {
        match self {
            FieldValue::One(s) => s.clone(),
            FieldValue::Many(v) => v.join(","),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::One(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::One(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Many(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Many(values.into_iter().map(str::to_string).collect())
    }
}
