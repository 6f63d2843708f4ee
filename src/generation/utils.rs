//! Identifier and naming transformations used by the compiler and emitter

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[vV][0-9.]+$").expect("valid version regex"));
static PLACEHOLDER_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\{[^}]*\}$").expect("valid placeholder regex"));

/// Capitalize the first character and lowercase the rest.
///
/// # Examples
/// ```
/// use apiweave::generation::utils::to_title_case;
///
/// assert_eq!(to_title_case("friends"), "Friends");
/// assert_eq!(to_title_case("getByUsername"), "Getbyusername");
/// ```
pub fn to_title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Normalize a documented parameter name into a camel-like identifier.
///
/// Parts separated by `-` or `.` are joined, every part after the first
/// title-cased: `user.id` → `userId`, `X-CSRF-TOKEN` → `XCsrfToken`.
pub fn normalize_parameter_name(name: &str) -> String {
    let mut parts = name.split(['-', '.']).filter(|part| !part.is_empty());
    let mut normalized = parts.next().unwrap_or_default().to_string();
    for part in parts {
        normalized.push_str(&to_title_case(part));
    }
    normalized
}

/// Derive a PascalCase method name from a path template.
///
/// Version segments (`v1`, `v2.1`) and placeholders (`{userId}`) are dropped.
/// When more than one segment remains and the first matches the owning class
/// name (case-insensitively), it is dropped as well.
pub fn method_name_from_path(path: &str, class_name: &str) -> String {
    let mut segments: Vec<&str> = path
        .split('/')
        .flat_map(|segment| segment.split('-'))
        .filter(|segment| !segment.is_empty())
        .filter(|segment| !PLACEHOLDER_SEGMENT.is_match(segment))
        .filter(|segment| !VERSION_SEGMENT.is_match(segment))
        .collect();

    if segments.len() > 1 && segments[0].eq_ignore_ascii_case(class_name) {
        segments.remove(0);
    }

    segments
        .iter()
        .map(|segment| to_title_case(segment))
        .collect::<String>()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Version string used for keys and file names: leading `v` and a trailing
/// `.0` are stripped (`v1` → `1`, `2.0` → `2`, `v1.5` → `1.5`).
pub fn version_key(version: &str) -> String {
    let trimmed = version.trim();
    let without_prefix = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    without_prefix
        .strip_suffix(".0")
        .unwrap_or(without_prefix)
        .to_string()
}

/// Converts a string to snake_case format for Rust identifiers.
///
/// Handles camelCase, PascalCase, kebab-case and space separated input.
///
/// # Examples
/// ```
/// use apiweave::generation::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("GetMessage"), "get_message");
/// assert_eq!(to_snake_case("catalog-api"), "catalog_api");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if ch == '-' || ch == '_' || ch == ' ' || ch == '.' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}

/// Turn any name into a valid Rust value identifier.
///
/// The name is snake_cased, reserved keywords get a trailing underscore and
/// a leading digit gets a leading underscore.
///
/// # Examples
/// ```
/// use apiweave::generation::utils::rust_identifier;
///
/// assert_eq!(rust_identifier("type"), "type_");
/// assert_eq!(rust_identifier("userId"), "user_id");
/// assert_eq!(rust_identifier("2fa"), "_2fa");
/// ```
pub fn rust_identifier(s: &str) -> String {
    let snake_case = to_snake_case(s);

    match snake_case.as_str() {
        "" => "value".to_string(),
        "as" | "break" | "const" | "continue" | "crate" | "else" | "enum" | "extern" | "false"
        | "fn" | "for" | "if" | "impl" | "in" | "let" | "loop" | "match" | "mod" | "move"
        | "mut" | "pub" | "ref" | "return" | "self" | "static" | "struct" | "super" | "trait"
        | "true" | "type" | "unsafe" | "use" | "where" | "while" | "async" | "await" | "dyn"
        | "abstract" | "become" | "box" | "do" | "final" | "macro" | "override" | "priv"
        | "typeof" | "unsized" | "virtual" | "yield" | "try" | "gen" => format!("{snake_case}_"),
        name if name.starts_with(|c: char| c.is_ascii_digit()) => format!("_{name}"),
        _ => snake_case,
    }
}
