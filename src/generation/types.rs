//! Intermediate representation produced by the compiler
//!
//! A [`GeneratedMethod`] describes one wrapper method independently of the
//! syntax it is finally rendered to.

use std::fmt;
use std::path::PathBuf;

/// Where a parameter travels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    FormData,
}

impl ParameterLocation {
    /// Parse a documented `in` value; anything unknown yields `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "body" => Some(Self::Body),
            "formData" => Some(Self::FormData),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
            Self::FormData => "formData",
        };
        f.write_str(name)
    }
}

/// One logical argument of a generated method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParam {
    /// Normalized argument name used by callers
    pub name: String,
    /// Name as documented, used on the wire
    pub wire_name: String,
    pub type_label: String,
    pub enum_values: Vec<String>,
    pub required: bool,
    pub location: ParameterLocation,
    pub description: Option<String>,
}

impl MethodParam {
    /// Type column of the doc line: the enum alternation when constrained
    pub fn doc_type(&self) -> String {
        if self.enum_values.is_empty() {
            self.type_label.clone()
        } else {
            self.enum_values
                .iter()
                .map(|value| format!("'{value}'"))
                .collect::<Vec<_>>()
                .join(" | ")
        }
    }

    /// Name column of the doc line, bracketed when optional
    pub fn doc_name(&self) -> String {
        if self.required {
            self.name.clone()
        } else {
            format!("[{}]", self.name)
        }
    }
}

/// Documentation block of a generated method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocBlock {
    pub description: String,
    pub deprecated: bool,
    /// Whether the parameter section is emitted at all
    pub full: bool,
}

/// A piece of the request URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPart {
    Literal(String),
    /// Runtime interpolation of a bound argument (or of the combined object)
    Interpolate(String),
}

/// A query or header contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEntry {
    /// One documented name bound to one argument
    Single { wire_name: String, var: String },
    /// Every entry of the combined object
    Spread { var: String },
}

/// The request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadSpec {
    pub var: String,
    pub form: bool,
}

/// The HTTP call a generated method performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpec {
    /// Lower-cased HTTP verb
    pub http_method: String,
    pub url: Vec<UrlPart>,
    pub params: Vec<WireEntry>,
    pub headers: Vec<WireEntry>,
    pub data: Option<PayloadSpec>,
}

/// One statement of a generated method body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Read an argument, enforcing presence when required
    Bind { var: String, required: bool },
    /// Build the single combined object of a grouped parameter
    Group {
        var: String,
        fields: Vec<(String, String)>,
    },
    Call(CallSpec),
}

/// A compiled wrapper for one (path, HTTP verb) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMethod {
    pub name: String,
    pub path: String,
    pub doc: DocBlock,
    pub params: Vec<MethodParam>,
    pub body: Vec<Statement>,
}

impl GeneratedMethod {
    pub fn call(&self) -> Option<&CallSpec> {
        self.body.iter().find_map(|statement| match statement {
            Statement::Call(call) => Some(call),
            _ => None,
        })
    }
}

/// Generated artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(required: bool, enum_values: &[&str]) -> MethodParam {
        MethodParam {
            name: "sortOrder".to_string(),
            wire_name: "sortOrder".to_string(),
            type_label: "string".to_string(),
            enum_values: enum_values.iter().map(|s| s.to_string()).collect(),
            required,
            location: ParameterLocation::Query,
            description: None,
        }
    }

    #[test]
    fn test_location_parse() {
        assert_eq!(ParameterLocation::parse("path"), Some(ParameterLocation::Path));
        assert_eq!(ParameterLocation::parse("formData"), Some(ParameterLocation::FormData));
        assert_eq!(ParameterLocation::parse("cookie"), None);
        assert_eq!(ParameterLocation::parse(""), None);
    }

    #[test]
    fn test_doc_columns() {
        assert_eq!(param(true, &[]).doc_type(), "string");
        assert_eq!(param(true, &[]).doc_name(), "sortOrder");
        assert_eq!(param(false, &["Asc", "Desc"]).doc_type(), "'Asc' | 'Desc'");
        assert_eq!(param(false, &[]).doc_name(), "[sortOrder]");
    }
}
