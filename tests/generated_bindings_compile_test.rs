//! Emitted bindings must build against the runtime they import

use std::path::Path;

use apiweave::generation::{ApiMetadata, ApiTree, SchemaDocument, compile_document};
use apiweave::infrastructure::generation::{EmitOptions, emit};
use serde_json::json;
use tempfile::TempDir;

fn metadata(identifier: &str, base_url: &str, versions: &[&str]) -> ApiMetadata {
    ApiMetadata {
        identifier: identifier.to_string(),
        base_url: base_url.to_string(),
        name: Some(format!("{identifier} Api")),
        description: Some("Endpoints for [testing] <b>bindings</b>".to_string()),
        versions: versions.iter().map(|v| v.to_string()).collect(),
    }
}

fn groups_v1() -> SchemaDocument {
    serde_json::from_value(json!({
        "paths": {
            "/v1/groups/{groupId}/relationships": {
                "post": {
                    "summary": "Update a relationship",
                    "parameters": [
                        {"name": "request", "in": "body", "required": true,
                         "schema": {"$ref": "#/definitions/Relationship"}}
                    ]
                }
            },
            "/v1/groups/{groupId}": {
                "get": {
                    "summary": "Group details",
                    "parameters": [
                        {"name": "groupId", "in": "path", "required": true, "type": "integer"},
                        {"name": "type", "in": "query", "type": "string", "enum": ["Public", "Private"]},
                        {"name": "X-CSRF-TOKEN", "in": "header", "type": "string"}
                    ]
                },
                "delete": {
                    "deprecated": true,
                    "parameters": [
                        {"name": "groupId", "in": "path", "required": true, "type": "integer"}
                    ]
                }
            },
            "/v1/groups/{groupId}/icon": {
                "post": {
                    "parameters": [
                        {"name": "groupId", "in": "path", "required": true, "type": "integer"},
                        {"name": "Files", "in": "formData", "type": "file"}
                    ]
                }
            },
            "/v1/groups/search": {
                "get": {
                    "parameters": [
                        {"name": "filters", "in": "query",
                         "schema": {"type": "object", "properties": {
                             "keyword": {"type": "string"},
                             "self": {"type": "boolean"}
                         }}}
                    ]
                }
            },
            "/v1/new": {"get": {"summary": "Newest groups"}},
            "/v1/{groupId}": {
                "patch": {
                    "parameters": [
                        {"name": "groupId", "in": "path", "required": true, "type": "integer"},
                        {"name": "body", "in": "body", "schema": {"type": "object"}}
                    ]
                }
            },
            "/v1/audit/{from}-{to}": {
                "get": {
                    "parameters": [
                        {"name": "from", "in": "path", "required": true, "type": "string"},
                        {"name": "to", "in": "path", "required": true, "type": "string"}
                    ]
                }
            }
        },
        "definitions": {
            "Relationship": {
                "type": "object",
                "required": ["group"],
                "properties": {
                    "group": {"type": "integer", "description": "Target group"},
                    "interpolate": {"type": "boolean"},
                    "args": {"type": "string"},
                    "payload": {"type": "string"},
                    "status": {"type": "string", "enum": ["Pending", "Accepted"]}
                }
            }
        }
    }))
    .unwrap()
}

fn http_document() -> SchemaDocument {
    serde_json::from_value(json!({
        "paths": {
            "/v1.5/users/{userId}": {
                "get": {"parameters": [
                    {"name": "userId", "in": "path", "required": true, "type": "integer"}
                ]}
            }
        }
    }))
    .unwrap()
}

fn representative_tree() -> ApiTree {
    let mut tree = ApiTree::new();

    let groups = metadata("Groups", "https://groups.example.com", &["v1"]);
    let methods = compile_document("Groups", &groups.base_url, &groups_v1()).unwrap();
    assert!(tree.insert_version(&groups, "v1", methods));

    // Collides with the container's own `http` field
    let http = metadata("Http", "https://http.example.com", &["v1.5"]);
    let methods = compile_document("Http", &http.base_url, &http_document()).unwrap();
    assert!(tree.insert_version(&http, "v1.5", methods));

    tree
}

fn write_bindings(dir: &Path) {
    let options = EmitOptions {
        output_dir: dir.join("bindings"),
        ..EmitOptions::default()
    };
    for artifact in emit(&representative_tree(), &options).unwrap() {
        std::fs::create_dir_all(artifact.path.parent().unwrap()).unwrap();
        std::fs::write(&artifact.path, artifact.content).unwrap();
    }

    std::fs::write(
        dir.join("main.rs"),
        r#"#[path = "bindings/mod.rs"]
mod bindings;

fn main() {
    let config = bindings::auth_config();
    let http = std::sync::Arc::new(
        apiweave::runtime::AuthenticatedClient::new(config, "credential", None).unwrap(),
    );
    let client = bindings::Client::with_identity(http, None);
    let _ = client.groups.v1.new2(apiweave::runtime::Args::new());
    let _ = client.http_api.v1_5.users(apiweave::runtime::Args::new());
}
"#,
    )
    .unwrap();
}

#[test]
fn test_generated_class_avoids_reserved_names() {
    let dir = TempDir::new().unwrap();
    write_bindings(dir.path());
    let class = std::fs::read_to_string(dir.path().join("bindings/Groups_1.rs")).unwrap();

    assert!(class.contains("pub fn new(client: Arc<AuthenticatedClient>) -> Self"));
    assert!(class.contains("pub async fn new2(&self, args: Args)"));
    assert!(!class.contains("pub async fn new(&self"));
    assert!(class.contains("let group_ = args.required(\"group\", \"Relationships\")?;"));
    assert!(class.contains("let interpolate_ = args.optional(\"interpolate\");"));
    assert!(class.contains("let payload = args.optional(\"payload\");"));
    assert!(class.contains("let payload_2 = group(["));
    assert!(class.contains(".data(payload_2)"));
    assert!(class.contains("let self_ = args.optional(\"self\");"));
    assert!(class.contains("#[deprecated]"));
    assert!(class.contains("let type_ = args.optional(\"type\");"));
    assert!(class.contains(".header(\"X-CSRF-TOKEN\", xcsrf_token)"));
    assert!(class.contains(".form(files)"));
    assert!(class.contains("pub async fn audit(&self, args: Args)"));

    let root = std::fs::read_to_string(dir.path().join("bindings/mod.rs")).unwrap();
    assert!(root.contains("pub http_api: HttpApi,"));
    assert!(root.contains("#[path = \"Http_1.5.rs\"]"));
}

#[test]
fn test_generated_bindings_compile() {
    let dir = TempDir::new().unwrap();
    write_bindings(dir.path());

    let cases = trybuild::TestCases::new();
    cases.pass(dir.path().join("main.rs"));
}
