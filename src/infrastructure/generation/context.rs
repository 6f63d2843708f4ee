//! Rust render contexts built from the compiled API tree

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::generation::utils::{rust_identifier, to_snake_case};
use crate::generation::{
    ApiEntry, CallSpec, GeneratedMethod, MethodParam, Statement, UrlPart, WireEntry,
    sanitizers::sanitize_doc_text,
};
use crate::runtime::AuthConfig;

/// Names the generated method bodies already use
const RESERVED_LOCALS: &[&str] = &["args", "request", "client", "group", "interpolate"];
/// Field names taken by the container itself
const RESERVED_FIELDS: &[&str] = &["http", "user_id", "user_name"];

#[derive(Debug, Clone, Serialize)]
pub struct BindingContext {
    pub local: String,
    /// Quoted argument key
    pub key: String,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub key: String,
    pub local: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupContext {
    pub local: String,
    pub fields: Vec<FieldContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RustMethodContext {
    pub fn_name: String,
    /// Quoted method name reported by a missing required argument
    pub name_literal: String,
    pub doc_lines: Vec<String>,
    pub deprecated: bool,
    pub bindings: Vec<BindingContext>,
    pub group: Option<GroupContext>,
    /// `Request::new(...)` expression
    pub request_head: String,
    /// Builder calls chained onto the request, one per line
    pub request_chain: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RustClassContext {
    pub version_key: String,
    pub file_name: String,
    pub module_name: String,
    pub struct_name: String,
    pub title: String,
    pub base_url: String,
    pub runtime_crate: String,
    pub methods: Vec<RustMethodContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionFieldContext {
    pub field: String,
    pub module_name: String,
    pub struct_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RustApiContext {
    pub identifier: String,
    pub struct_name: String,
    pub field: String,
    pub doc_lines: Vec<String>,
    pub versions: Vec<VersionFieldContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub cookie_name: String,
    pub csrf_header: String,
    pub refresh_url: String,
    pub identity_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RustAggregatorContext {
    pub runtime_crate: String,
    pub modules: Vec<RustClassContext>,
    pub apis: Vec<RustApiContext>,
    pub auth: AuthContext,
}

/// Rust string literal for `value`
pub fn quote(value: &str) -> String {
    format!("{value:?}")
}

/// Format string escaping: braces are doubled
fn format_escape(value: &str) -> String {
    value.replace('{', "{{").replace('}', "}}")
}

/// Identifier-safe form of an already normalized version key
fn key_ident(version_key: &str) -> String {
    version_key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// File name of a per-version class: `{Identifier}_{versionKey}.rs`
pub fn class_file_name(identifier: &str, version_key: &str) -> String {
    format!("{identifier}_{version_key}.rs")
}

pub fn class_struct_name(identifier: &str, version_key: &str) -> String {
    format!("{identifier}V{}", key_ident(version_key))
}

pub fn class_module_name(identifier: &str, version_key: &str) -> String {
    format!("{}_v{}", to_snake_case(identifier), key_ident(version_key))
}

/// Build the render context of one (API, version) class
pub fn build_class_context(
    api: &ApiEntry,
    version_key: &str,
    methods: &[GeneratedMethod],
    runtime_crate: &str,
) -> RustClassContext {
    let identifier = &api.metadata.identifier;
    let title = match &api.metadata.name {
        Some(name) if !name.trim().is_empty() => format!("{} v{}", sanitize_doc_text(name), version_key),
        _ => format!("{identifier} v{version_key}"),
    };

    RustClassContext {
        version_key: version_key.to_string(),
        file_name: class_file_name(identifier, version_key),
        module_name: class_module_name(identifier, version_key),
        struct_name: class_struct_name(identifier, version_key),
        title,
        base_url: api.metadata.base_url.clone(),
        runtime_crate: runtime_crate.to_string(),
        methods: methods.iter().map(build_method_context).collect(),
    }
}

/// Translate one compiled method into its Rust rendering
pub fn build_method_context(method: &GeneratedMethod) -> RustMethodContext {
    let mut locals = LocalNames::default();
    let mut bindings = Vec::new();
    let mut group = None;
    let mut request = (String::new(), Vec::new());

    for statement in &method.body {
        match statement {
            Statement::Bind { var, required } => bindings.push(BindingContext {
                local: locals.bind(var),
                key: quote(var),
                required: *required,
            }),
            Statement::Group { var, fields } => {
                let fields = fields
                    .iter()
                    .map(|(wire_name, field_var)| FieldContext {
                        key: quote(wire_name),
                        local: locals.get(field_var),
                    })
                    .collect();
                group = Some(GroupContext {
                    local: locals.bind(var),
                    fields,
                });
            }
            Statement::Call(call) => request = render_request(call, &locals),
        }
    }

    RustMethodContext {
        fn_name: rust_identifier(&method.name),
        name_literal: quote(&method.name),
        doc_lines: doc_lines(method),
        deprecated: method.doc.deprecated,
        bindings,
        group,
        request_head: request.0,
        request_chain: request.1,
    }
}

fn render_request(call: &CallSpec, locals: &LocalNames) -> (String, Vec<String>) {
    let mut format_string = String::new();
    let mut format_args = String::new();
    for part in &call.url {
        match part {
            UrlPart::Literal(text) => format_string.push_str(&format_escape(text)),
            UrlPart::Interpolate(var) => {
                format_string.push_str("{}");
                format_args.push_str(&format!(", interpolate(&{})", locals.get(var)));
            }
        }
    }
    let head = format!(
        "Request::new({}, format!({}{}))",
        quote(&call.http_method),
        quote(&format_string),
        format_args
    );

    let mut chain = Vec::new();
    for entry in &call.params {
        chain.push(wire_call("param", "params", entry, locals));
    }
    for entry in &call.headers {
        chain.push(wire_call("header", "headers", entry, locals));
    }
    if let Some(payload) = &call.data {
        let builder = if payload.form { "form" } else { "data" };
        chain.push(format!(".{}({})", builder, locals.get(&payload.var)));
    }

    (head, chain)
}

fn wire_call(single: &str, spread: &str, entry: &WireEntry, locals: &LocalNames) -> String {
    match entry {
        WireEntry::Single { wire_name, var } => {
            format!(".{}({}, {})", single, quote(wire_name), locals.get(var))
        }
        WireEntry::Spread { var } => format!(".{}(&{})", spread, locals.get(var)),
    }
}

fn doc_lines(method: &GeneratedMethod) -> Vec<String> {
    let mut lines = Vec::new();
    if !method.doc.description.is_empty() {
        lines.push(method.doc.description.clone());
    }
    if !method.doc.full {
        return lines;
    }

    if method.doc.deprecated {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("**Deprecated**".to_string());
    }
    if !method.params.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("# Arguments".to_string());
        lines.push(String::new());
        lines.extend(method.params.iter().map(param_doc_line));
    }
    lines
}

fn param_doc_line(param: &MethodParam) -> String {
    let mut line = format!("* `{}` ({})", param.doc_name(), param.doc_type());
    if let Some(description) = param.description.as_deref().map(sanitize_doc_text) {
        if !description.is_empty() {
            line.push_str(" - ");
            line.push_str(&description);
        }
    }
    line
}

/// Maps IR variables to unique Rust locals
#[derive(Default)]
struct LocalNames {
    assigned: HashMap<String, String>,
    taken: HashSet<String>,
}

impl LocalNames {
    fn bind(&mut self, var: &str) -> String {
        let base = rust_identifier(var);
        let base = if RESERVED_LOCALS.contains(&base.as_str()) {
            format!("{base}_")
        } else {
            base
        };

        let mut local = base.clone();
        let mut suffix = 2;
        while !self.taken.insert(local.clone()) {
            local = format!("{base}_{suffix}");
            suffix += 1;
        }
        self.assigned.insert(var.to_string(), local.clone());
        local
    }

    fn get(&self, var: &str) -> String {
        self.assigned
            .get(var)
            .cloned()
            .unwrap_or_else(|| rust_identifier(var))
    }
}

/// Build the aggregator context over every emitted class
pub fn build_aggregator_context(
    apis: &[(&ApiEntry, Vec<RustClassContext>)],
    runtime_crate: &str,
    auth: &AuthConfig,
) -> RustAggregatorContext {
    let mut modules = Vec::new();
    let mut api_contexts = Vec::new();
    let mut fields: HashSet<String> = RESERVED_FIELDS.iter().map(|f| f.to_string()).collect();

    for (api, classes) in apis {
        let identifier = &api.metadata.identifier;
        let mut field = rust_identifier(identifier);
        if !fields.insert(field.clone()) {
            field = format!("{field}_api");
            fields.insert(field.clone());
        }

        let mut doc_lines = Vec::new();
        if let Some(name) = api.metadata.name.as_deref().map(sanitize_doc_text) {
            if !name.is_empty() {
                doc_lines.push(name);
            }
        }
        if let Some(description) = api.metadata.description.as_deref().map(sanitize_doc_text) {
            if !description.is_empty() {
                if !doc_lines.is_empty() {
                    doc_lines.push(String::new());
                }
                doc_lines.push(description);
            }
        }

        let versions = classes
            .iter()
            .map(|class| VersionFieldContext {
                field: format!("v{}", key_ident(&class.version_key)),
                module_name: class.module_name.clone(),
                struct_name: class.struct_name.clone(),
            })
            .collect();

        api_contexts.push(RustApiContext {
            identifier: identifier.clone(),
            struct_name: format!("{identifier}Api"),
            field,
            doc_lines,
            versions,
        });
        modules.extend(classes.iter().cloned());
    }

    RustAggregatorContext {
        runtime_crate: runtime_crate.to_string(),
        modules,
        apis: api_contexts,
        auth: AuthContext {
            cookie_name: quote(&auth.cookie_name),
            csrf_header: quote(&auth.csrf_header),
            refresh_url: quote(&auth.refresh_url),
            identity_url: quote(&auth.identity_url),
        },
    }
}
