//! Loosely typed Swagger document model
//!
//! Documents come from services we do not control, so every node
//! deserializes infallibly into a [`SchemaNode`] and shapes are only
//! interpreted later by [`resolve`].

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Named type definitions of one document (`#/definitions/...`)
pub type Definitions = BTreeMap<String, SchemaNode>;

/// HTTP methods recognized as operations inside a path item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
            HttpMethod::Head,
            HttpMethod::Options,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema as written in the document: either a `$ref` or an inline shape
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Reference(String),
    Inline(InlineSchema),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InlineSchema {
    Object(ObjectSchema),
    Array(ArraySchema),
    Primitive(PrimitiveSchema),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    pub items: Option<Box<SchemaNode>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrimitiveSchema {
    pub type_name: Option<String>,
    pub format: Option<String>,
    pub enum_values: Vec<JsonValue>,
    pub description: Option<String>,
}

impl SchemaNode {
    /// Interpret an arbitrary JSON value as a schema node
    pub fn from_value(value: &JsonValue) -> Self {
        if let Some(reference) = value.get("$ref").and_then(JsonValue::as_str) {
            let name = reference.rsplit('/').next().unwrap_or(reference);
            return SchemaNode::Reference(name.to_string());
        }

        let type_name = value.get("type").and_then(JsonValue::as_str);
        let description = string_field(value, "description");

        if type_name == Some("array") || (type_name.is_none() && value.get("items").is_some()) {
            return SchemaNode::Inline(InlineSchema::Array(ArraySchema {
                items: value
                    .get("items")
                    .map(|items| Box::new(SchemaNode::from_value(items))),
                description,
            }));
        }

        if type_name == Some("object") || (type_name.is_none() && value.get("properties").is_some())
        {
            let properties = value
                .get("properties")
                .and_then(JsonValue::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, node)| (name.clone(), SchemaNode::from_value(node)))
                        .collect()
                })
                .unwrap_or_default();
            let required = value
                .get("required")
                .and_then(JsonValue::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(JsonValue::as_str)
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();
            return SchemaNode::Inline(InlineSchema::Object(ObjectSchema {
                properties,
                required,
                description,
            }));
        }

        SchemaNode::Inline(InlineSchema::Primitive(PrimitiveSchema {
            type_name: type_name.map(String::from),
            format: string_field(value, "format"),
            enum_values: value
                .get("enum")
                .and_then(JsonValue::as_array)
                .cloned()
                .unwrap_or_default(),
            description,
        }))
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(SchemaNode::from_value(&value))
    }
}

/// Outcome of following at most one `$ref`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSchema<'a> {
    /// Definition name when the node was a reference
    pub reference: Option<&'a str>,
    /// The inline shape, if one was reached within one indirection
    pub schema: Option<&'a InlineSchema>,
}

impl<'a> ResolvedSchema<'a> {
    pub fn as_object(&self) -> Option<&'a ObjectSchema> {
        match self.schema {
            Some(InlineSchema::Object(object)) => Some(object),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        self.as_object().is_some()
    }
}

/// Resolve a node against the document definitions.
///
/// Only one level of indirection is followed: a reference to a definition
/// that is itself a reference stays unresolved.
pub fn resolve<'a>(node: &'a SchemaNode, definitions: &'a Definitions) -> ResolvedSchema<'a> {
    match node {
        SchemaNode::Inline(schema) => ResolvedSchema {
            reference: None,
            schema: Some(schema),
        },
        SchemaNode::Reference(name) => ResolvedSchema {
            reference: Some(name.as_str()),
            schema: match definitions.get(name) {
                Some(SchemaNode::Inline(schema)) => Some(schema),
                _ => None,
            },
        },
    }
}

/// Human-readable logical type of a node, e.g. `integer` or `array<string>`
pub fn type_label(node: &SchemaNode, definitions: &Definitions) -> String {
    let resolved = resolve(node, definitions);
    match resolved.schema {
        Some(InlineSchema::Array(array)) => {
            let element = array
                .items
                .as_deref()
                .map(|items| element_label(items, definitions))
                .unwrap_or_else(|| "any".to_string());
            format!("array<{element}>")
        }
        _ => element_label(node, definitions),
    }
}

fn element_label(node: &SchemaNode, definitions: &Definitions) -> String {
    let resolved = resolve(node, definitions);
    match resolved.schema {
        Some(InlineSchema::Primitive(primitive)) => primitive
            .type_name
            .clone()
            .unwrap_or_else(|| "any".to_string()),
        Some(InlineSchema::Object(_)) => resolved.reference.unwrap_or("object").to_string(),
        Some(InlineSchema::Array(_)) => "array".to_string(),
        None => resolved.reference.unwrap_or("any").to_string(),
    }
}

/// Enum constraint of a node, if it resolves to a constrained primitive
pub fn enum_values(node: &SchemaNode, definitions: &Definitions) -> Vec<JsonValue> {
    match resolve(node, definitions).schema {
        Some(InlineSchema::Primitive(primitive)) => primitive.enum_values.clone(),
        _ => Vec::new(),
    }
}

/// Description attached to a node (after one indirection)
pub fn description(node: &SchemaNode, definitions: &Definitions) -> Option<String> {
    match resolve(node, definitions).schema? {
        InlineSchema::Object(object) => object.description.clone(),
        InlineSchema::Array(array) => array.description.clone(),
        InlineSchema::Primitive(primitive) => primitive.description.clone(),
    }
}

/// One declared operation parameter (Swagger 2 shape)
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub required: bool,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub format: Option<String>,
    pub items: Option<SchemaNode>,
    #[serde(rename = "enum")]
    pub enum_values: Vec<JsonValue>,
    pub schema: Option<SchemaNode>,
}

impl ParameterSpec {
    /// The parameter's schema, synthesized from `type`/`items`/`enum` when
    /// no explicit `schema` is given.
    pub fn node(&self) -> SchemaNode {
        if let Some(schema) = &self.schema {
            return schema.clone();
        }
        if self.type_name.as_deref() == Some("array") {
            return SchemaNode::Inline(InlineSchema::Array(ArraySchema {
                items: self.items.clone().map(Box::new),
                description: self.description.clone(),
            }));
        }
        SchemaNode::Inline(InlineSchema::Primitive(PrimitiveSchema {
            type_name: self.type_name.clone(),
            format: self.format.clone(),
            enum_values: self.enum_values.clone(),
            description: self.description.clone(),
        }))
    }
}

/// One documented (path, method) pair
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct OperationSpec {
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub deprecated: bool,
    pub parameters: Vec<ParameterSpec>,
}

/// Operations documented under one path template, in method order
#[derive(Debug, Clone, PartialEq)]
pub struct PathOperations {
    pub path: String,
    pub operations: Vec<(HttpMethod, OperationSpec)>,
}

/// Full per-version document: paths plus type definitions
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SchemaDocument {
    pub paths: BTreeMap<String, BTreeMap<String, JsonValue>>,
    pub definitions: Definitions,
}

impl SchemaDocument {
    /// Every path with its recognized operations.
    ///
    /// Non-method keys (`parameters`, vendor extensions) are ignored, as are
    /// operations whose shape cannot be read.
    pub fn path_operations(&self) -> Vec<PathOperations> {
        self.paths
            .iter()
            .map(|(path, item)| {
                let mut operations: Vec<(HttpMethod, OperationSpec)> = item
                    .iter()
                    .filter_map(|(key, value)| {
                        let method = HttpMethod::parse(key)?;
                        match OperationSpec::deserialize(value) {
                            Ok(operation) => Some((method, operation)),
                            Err(e) => {
                                warn!(path = %path, method = %method, error = %e, "Skipping unreadable operation");
                                None
                            }
                        }
                    })
                    .collect();
                operations.sort_by_key(|(method, _)| *method);
                PathOperations {
                    path: path.clone(),
                    operations,
                }
            })
            .filter(|entry| !entry.operations.is_empty())
            .collect()
    }
}

fn string_field(value: &JsonValue, key: &str) -> Option<String> {
    value.get(key).and_then(JsonValue::as_str).map(String::from)
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Bool(b) => b,
        JsonValue::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definitions() -> Definitions {
        serde_json::from_value(json!({
            "User": {
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": {"type": "integer"},
                    "name": {"type": "string"}
                }
            },
            "Alias": {"$ref": "#/definitions/User"},
            "SortOrder": {"type": "string", "enum": ["Asc", "Desc"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_reference_name_is_last_segment() {
        let node = SchemaNode::from_value(&json!({"$ref": "#/definitions/User"}));
        assert_eq!(node, SchemaNode::Reference("User".to_string()));
    }

    #[test]
    fn test_resolve_one_level() {
        let defs = definitions();
        let node = SchemaNode::Reference("User".to_string());
        let resolved = resolve(&node, &defs);
        assert_eq!(resolved.reference, Some("User"));
        assert!(resolved.is_object());
        assert_eq!(resolved.as_object().unwrap().properties.len(), 2);
    }

    #[test]
    fn test_resolve_does_not_follow_second_reference() {
        let defs = definitions();
        let node = SchemaNode::Reference("Alias".to_string());
        let resolved = resolve(&node, &defs);
        assert_eq!(resolved.schema, None);
        assert!(!resolved.is_object());
        assert_eq!(type_label(&node, &defs), "Alias");
    }

    #[test]
    fn test_type_labels() {
        let defs = definitions();
        let cases = [
            (json!({"type": "integer"}), "integer"),
            (json!({"type": "array", "items": {"type": "string"}}), "array<string>"),
            (json!({"type": "array", "items": {"$ref": "#/definitions/User"}}), "array<User>"),
            (json!({"$ref": "#/definitions/User"}), "User"),
            (json!({"type": "object"}), "object"),
            (json!({"type": "array"}), "array<any>"),
            (json!({}), "any"),
        ];
        for (value, expected) in cases {
            assert_eq!(type_label(&SchemaNode::from_value(&value), &defs), expected);
        }
    }

    #[test]
    fn test_enum_values_follow_reference() {
        let defs = definitions();
        let node = SchemaNode::Reference("SortOrder".to_string());
        assert_eq!(enum_values(&node, &defs), vec![json!("Asc"), json!("Desc")]);
    }

    #[test]
    fn test_parameter_node_synthesized_from_type() {
        let param: ParameterSpec = serde_json::from_value(json!({
            "name": "userIds",
            "in": "query",
            "required": true,
            "type": "array",
            "items": {"type": "integer", "format": "int64"}
        }))
        .unwrap();
        assert!(param.required);
        assert_eq!(type_label(&param.node(), &Definitions::new()), "array<integer>");
    }

    #[test]
    fn test_path_operations_skip_non_methods() {
        let doc: SchemaDocument = serde_json::from_value(json!({
            "paths": {
                "/v2/message": {
                    "parameters": [],
                    "post": {"summary": "Send"},
                    "get": {"summary": "Read", "deprecated": "true"}
                },
                "/v1/empty": {"x-internal": true}
            }
        }))
        .unwrap();

        let paths = doc.path_operations();
        assert_eq!(paths.len(), 1);
        let methods: Vec<_> = paths[0].operations.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
        assert!(paths[0].operations[0].1.deprecated);
    }

    #[test]
    fn test_http_method_parse() {
        assert_eq!(HttpMethod::parse("GET"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("parameters"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "delete");
    }
}
