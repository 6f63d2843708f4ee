//! Schema-to-method compiler
//!
//! Turns one documented operation into a [`GeneratedMethod`]: parameter
//! placement, required/optional handling, naming, docs and the HTTP call.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};

use crate::generation::sanitizers::sanitize_doc_text;
use crate::generation::schema::{
    Definitions, HttpMethod, OperationSpec, ParameterSpec, SchemaDocument, SchemaNode,
    description, enum_values, resolve, type_label,
};
use crate::generation::utils::{
    method_name_from_path, normalize_parameter_name, rust_identifier, to_title_case,
};
use crate::generation::{
    CallSpec, DocBlock, GeneratedMethod, GenerationError, MethodParam, ParameterLocation,
    PayloadSpec, Statement, UrlPart, WireEntry,
};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("valid placeholder regex"));

/// Variable holding the combined object of a grouped parameter
pub const GROUP_VAR: &str = "payload";

/// Associated functions every generated class already defines
const RESERVED_METHODS: &[&str] = &["new"];

/// Everything the compiler needs to know about one operation
#[derive(Debug, Clone, Copy)]
pub struct OperationContext<'a> {
    /// Class the method lands in (the API identifier)
    pub class_name: &'a str,
    /// Scheme and host the path is appended to
    pub base_url: &'a str,
    pub path: &'a str,
    pub method: HttpMethod,
    /// Number of methods documented for this path
    pub verb_count: usize,
    pub operation: &'a OperationSpec,
    pub definitions: &'a Definitions,
}

/// Compile every operation of a document, in path then method order.
///
/// Later methods whose names collide with an earlier one get a numeric suffix.
pub fn compile_document(
    class_name: &str,
    base_url: &str,
    document: &SchemaDocument,
) -> Result<Vec<GeneratedMethod>, GenerationError> {
    let mut methods = Vec::new();
    let mut taken: HashSet<String> = RESERVED_METHODS.iter().map(|m| m.to_string()).collect();

    for entry in document.path_operations() {
        for (method, operation) in &entry.operations {
            let mut compiled = compile_operation(&OperationContext {
                class_name,
                base_url,
                path: &entry.path,
                method: *method,
                verb_count: entry.operations.len(),
                operation,
                definitions: &document.definitions,
            })?;

            if !taken.insert(rust_identifier(&compiled.name)) {
                let base = compiled.name.clone();
                let mut suffix = 2;
                while !taken.insert(rust_identifier(&format!("{base}{suffix}"))) {
                    suffix += 1;
                }
                compiled.name = format!("{base}{suffix}");
            }
            methods.push(compiled);
        }
    }

    Ok(methods)
}

/// Compile one (path, verb) operation
pub fn compile_operation(ctx: &OperationContext<'_>) -> Result<GeneratedMethod, GenerationError> {
    let placeholders = path_placeholders(ctx.path);
    let declared = required_first(ctx.operation.parameters.iter().collect(), |p| p.required);
    let mut call = CallBuilder::default();
    let mut params = Vec::new();
    let mut body = Vec::new();

    let group = match declared.as_slice() {
        [single] => {
            let node = single.node();
            let object = resolve(&node, ctx.definitions).as_object().cloned();
            object.map(|object| (*single, object))
        }
        _ => None,
    };

    if let Some((parameter, object)) = group {
        let location = locate(parameter, &placeholders, ctx)?;
        let properties: Vec<&(String, SchemaNode)> = required_first(
            object.properties.iter().collect(),
            |(name, _)| object.required.contains(name),
        );

        for (name, node) in properties {
            params.push(MethodParam {
                name: normalize_parameter_name(name),
                wire_name: name.clone(),
                type_label: type_label(node, ctx.definitions),
                enum_values: enum_strings(&enum_values(node, ctx.definitions)),
                required: object.required.contains(name),
                location,
                description: description(node, ctx.definitions),
            });
        }

        body.extend(params.iter().map(|p| Statement::Bind {
            var: p.name.clone(),
            required: p.required,
        }));
        body.push(Statement::Group {
            var: GROUP_VAR.to_string(),
            fields: params
                .iter()
                .map(|p| (p.wire_name.clone(), p.name.clone()))
                .collect(),
        });
        call.route(ctx, location, &parameter.name, GROUP_VAR, true)?;
    } else {
        for parameter in declared {
            let location = locate(parameter, &placeholders, ctx)?;
            let node = parameter.node();
            let mut enum_list = enum_strings(&parameter.enum_values);
            if enum_list.is_empty() {
                enum_list = enum_strings(&enum_values(&node, ctx.definitions));
            }
            let param = MethodParam {
                name: normalize_parameter_name(&parameter.name),
                wire_name: parameter.name.clone(),
                type_label: type_label(&node, ctx.definitions),
                enum_values: enum_list,
                required: parameter.required,
                location,
                description: parameter
                    .description
                    .clone()
                    .or_else(|| description(&node, ctx.definitions)),
            };
            call.route(ctx, location, &param.wire_name, &param.name, false)?;
            body.push(Statement::Bind {
                var: param.name.clone(),
                required: param.required,
            });
            params.push(param);
        }
    }

    body.push(Statement::Call(call.finish(ctx)));

    let doc = DocBlock {
        description: sanitize_doc_text(
            [&ctx.operation.summary, &ctx.operation.description]
                .into_iter()
                .flatten()
                .find(|text| !text.trim().is_empty())
                .map(String::as_str)
                .unwrap_or_default(),
        ),
        deprecated: ctx.operation.deprecated,
        full: !ctx.operation.parameters.is_empty() || ctx.operation.deprecated,
    };

    Ok(GeneratedMethod {
        name: method_name(ctx),
        path: ctx.path.to_string(),
        doc,
        params,
        body,
    })
}

fn method_name(ctx: &OperationContext<'_>) -> String {
    let name = method_name_from_path(ctx.path, ctx.class_name);
    if ctx.verb_count > 1 || name.is_empty() {
        format!("{}{}", to_title_case(ctx.method.as_str()), name)
    } else {
        name
    }
}

/// Placeholder names of a path template (`/v1/users/{userId}` → `userId`)
pub fn path_placeholders(path: &str) -> HashSet<String> {
    PLACEHOLDER
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Stable partition: required entries first, original order otherwise kept
fn required_first<T>(items: Vec<T>, is_required: impl Fn(&T) -> bool) -> Vec<T> {
    let (mut required, optional): (Vec<T>, Vec<T>) = items.into_iter().partition(is_required);
    required.extend(optional);
    required
}

/// A name matching a placeholder is path-bound whatever the document claims
fn locate(
    parameter: &ParameterSpec,
    placeholders: &HashSet<String>,
    ctx: &OperationContext<'_>,
) -> Result<ParameterLocation, GenerationError> {
    if placeholders.contains(&parameter.name) {
        return Ok(ParameterLocation::Path);
    }
    ParameterLocation::parse(&parameter.location).ok_or_else(|| {
        GenerationError::UnsupportedLocation {
            location: parameter.location.clone(),
            parameter: parameter.name.clone(),
            method: ctx.method.to_string(),
            path: ctx.path.to_string(),
        }
    })
}

fn enum_strings(values: &[JsonValue]) -> Vec<String> {
    values
        .iter()
        .map(|value| match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

#[derive(Default)]
struct CallBuilder {
    path_bindings: HashMap<String, String>,
    params: Vec<WireEntry>,
    headers: Vec<WireEntry>,
    data: Option<(PayloadSpec, String)>,
}

impl CallBuilder {
    fn route(
        &mut self,
        ctx: &OperationContext<'_>,
        location: ParameterLocation,
        wire_name: &str,
        var: &str,
        spread: bool,
    ) -> Result<(), GenerationError> {
        let entry = if spread {
            WireEntry::Spread {
                var: var.to_string(),
            }
        } else {
            WireEntry::Single {
                wire_name: wire_name.to_string(),
                var: var.to_string(),
            }
        };

        match location {
            ParameterLocation::Path => {
                self.path_bindings
                    .insert(wire_name.to_string(), var.to_string());
            }
            ParameterLocation::Query => self.params.push(entry),
            ParameterLocation::Header => self.headers.push(entry),
            ParameterLocation::Body | ParameterLocation::FormData => {
                if let Some((_, first)) = &self.data {
                    return Err(GenerationError::DuplicateBody {
                        method: ctx.method.to_string(),
                        path: ctx.path.to_string(),
                        first: first.clone(),
                        second: wire_name.to_string(),
                    });
                }
                self.data = Some((
                    PayloadSpec {
                        var: var.to_string(),
                        form: location == ParameterLocation::FormData,
                    },
                    wire_name.to_string(),
                ));
            }
        }
        Ok(())
    }

    fn finish(self, ctx: &OperationContext<'_>) -> CallSpec {
        let mut url = Vec::new();
        let mut literal = ctx.base_url.trim_end_matches('/').to_string();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(ctx.path) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            literal.push_str(&ctx.path[last..whole.start()]);
            match self.path_bindings.get(name.as_str()) {
                Some(var) => {
                    url.push(UrlPart::Literal(std::mem::take(&mut literal)));
                    url.push(UrlPart::Interpolate(var.clone()));
                }
                None => literal.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        literal.push_str(&ctx.path[last..]);
        url.push(UrlPart::Literal(literal));
        url.retain(|part| !matches!(part, UrlPart::Literal(s) if s.is_empty()));

        CallSpec {
            http_method: ctx.method.as_str().to_string(),
            url,
            params: self.params,
            headers: self.headers,
            data: self.data.map(|(payload, _)| payload),
        }
    }
}
