//! JSON Schema (Draft 2020-12) export of the databag schemas.

use serde_json::{json, Map, Value};

use crate::config::ValidationConfig;
use crate::databag::{DataBagSchema, ProviderSchema, RequirerSchema};
use crate::error::Side;
use crate::field::{FieldKind, FieldSpec};

const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// JSON Schema document for one side of the relation.
///
/// In strict mode every object schema closes `additionalProperties`, except
/// `unit`, which stays unconstrained.
pub fn document(side: Side, config: &ValidationConfig) -> Value {
    match side {
        Side::Provider => document_for::<ProviderSchema>("ProviderSchema", config),
        Side::Requirer => document_for::<RequirerSchema>("RequirerSchema", config),
    }
}

fn document_for<S: DataBagSchema>(title: &str, config: &ValidationConfig) -> Value {
    let mut root = Map::new();
    root.insert("$schema".to_string(), json!(DRAFT_2020_12));
    root.insert("title".to_string(), json!(title));
    root.insert(
        "description".to_string(),
        json!(format!(
            "The schema for the {} side of the zookeeper_client relation.",
            S::SIDE
        )),
    );
    root.insert("type".to_string(), json!("object"));
    root.insert(
        "properties".to_string(),
        json!({
            "app": app_schema(S::fields(), config),
            "unit": {}
        }),
    );
    root.insert("required".to_string(), json!(["app"]));
    if config.strict_mode {
        root.insert("additionalProperties".to_string(), Value::Bool(false));
    }
    Value::Object(root)
}

fn app_schema(fields: &[FieldSpec], config: &ValidationConfig) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|spec| (spec.wire_name.to_string(), field_schema(spec)))
        .collect();
    let required: Vec<&str> = fields
        .iter()
        .filter(|spec| spec.presence.is_required())
        .map(|spec| spec.wire_name)
        .collect();

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    schema.insert("required".to_string(), json!(required));
    if config.strict_mode {
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
    }
    Value::Object(schema)
}

fn field_schema(spec: &FieldSpec) -> Value {
    let mut schema = match spec.kind {
        FieldKind::Text | FieldKind::EndpointList => type_schema("string", spec),
        FieldKind::TextList => {
            let mut schema = type_schema("array", spec);
            schema.insert("items".to_string(), json!({"type": "string"}));
            schema
        }
    };

    if spec.kind == FieldKind::EndpointList {
        // Entries are parsed after the shape check; this only pins the
        // comma-separated layout.
        schema.insert("pattern".to_string(), json!(r"^[^,]+(,[^,]+)*$"));
    }

    schema.insert("title".to_string(), json!(spec.title));
    schema.insert("description".to_string(), json!(spec.description));
    if let Ok(example) = serde_json::from_str::<Value>(spec.example) {
        schema.insert("examples".to_string(), json!([example]));
    }
    Value::Object(schema)
}

fn type_schema(kind: &str, spec: &FieldSpec) -> Map<String, Value> {
    let mut schema = Map::new();
    let kind = if spec.presence.is_nullable() {
        json!([kind, "null"])
    } else {
        json!(kind)
    };
    schema.insert("type".to_string(), kind);
    schema
}
