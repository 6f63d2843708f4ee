//! Named-argument bag passed to every generated method

use serde_json::{Map, Value};

use crate::runtime::{ClientError, Result};

/// Named arguments for a generated method call.
///
/// Keys are the normalized parameter names shown in the method docs
/// (`userId`, `sortOrder`, ...). An explicit `null` counts as supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Map<String, Value>);

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Fetch a required argument, failing only when the caller omitted it
    pub fn required(&self, name: &str, method: &str) -> Result<Value> {
        self.0
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::MissingParameter {
                parameter: name.to_string(),
                method: method.to_string(),
            })
    }

    /// Fetch an optional argument; omitted arguments read as `null`
    pub fn optional(&self, name: &str) -> Value {
        self.0.get(name).cloned().unwrap_or(Value::Null)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Args {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
