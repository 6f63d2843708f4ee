//! Request description built by generated methods

use serde_json::Value;

/// Request body shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`
    Form(Value),
}

/// One outgoing call: verb, fully interpolated URL, query, headers and payload.
///
/// `null` query and header values are skipped so that omitted optional
/// arguments never reach the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) params: Vec<(String, String)>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) payload: Option<Payload>,
}

impl Request {
    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
            payload: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("get", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("post", url)
    }

    /// Add one query parameter; arrays repeat the key once per element
    pub fn param(mut self, name: &str, value: Value) -> Self {
        push_pairs(&mut self.params, name, &value);
        self
    }

    /// Spread every entry of an object into the query
    pub fn params(mut self, values: &Value) -> Self {
        if let Some(map) = values.as_object() {
            for (name, value) in map {
                push_pairs(&mut self.params, name, value);
            }
        }
        self
    }

    pub fn header(mut self, name: &str, value: Value) -> Self {
        if !value.is_null() {
            self.headers.push((name.to_string(), interpolate(&value)));
        }
        self
    }

    /// Spread every entry of an object into the request headers
    pub fn headers(mut self, values: &Value) -> Self {
        if let Some(map) = values.as_object() {
            for (name, value) in map {
                if !value.is_null() {
                    self.headers.push((name.clone(), interpolate(value)));
                }
            }
        }
        self
    }

    /// JSON body; `null` leaves the request without one
    pub fn data(mut self, value: Value) -> Self {
        self.payload = (!value.is_null()).then_some(Payload::Json(value));
        self
    }

    pub fn form(mut self, value: Value) -> Self {
        self.payload = (!value.is_null()).then_some(Payload::Form(value));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn header_pairs(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }
}

/// Render a value for use inside a URL path, query string or header.
///
/// Strings are used verbatim; everything else is written as JSON text.
pub fn interpolate(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Combine named values into one object, leaving out `null` entries
pub fn group<K, I>(fields: I) -> Value
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    Value::Object(
        fields
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| (name.into(), value))
            .collect(),
    )
}

/// Flatten a form payload into key/value pairs
pub(crate) fn form_pairs(value: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    match value {
        Value::Object(map) => {
            for (name, value) in map {
                push_pairs(&mut pairs, name, value);
            }
        }
        Value::Null => {}
        other => pairs.push(("value".to_string(), interpolate(other))),
    }
    pairs
}

fn push_pairs(pairs: &mut Vec<(String, String)>, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items.iter().filter(|item| !item.is_null()) {
                pairs.push((name.to_string(), interpolate(item)));
            }
        }
        other => pairs.push((name.to_string(), interpolate(other))),
    }
}
