use jsonschema::error::{TypeKind, ValidationErrorKind};
use jsonschema::paths::{Location, LocationSegment};
use jsonschema::{ValidationError, Validator};
use serde_json::Value;

use crate::config::ValidationConfig;
use crate::document::document;
use crate::endpoint::invalid_entries;
use crate::error::{Result, SchemaError, Side, Violation, ViolationKind};
use crate::field::{hyphenated_match, FieldKind, FieldSpec};
use crate::provider::PROVIDER_FIELDS;
use crate::requirer::REQUIRER_FIELDS;

const APP_KEY: &str = "app";

/// The JSON Schema document of one side, compiled once and reused.
///
/// The compiled document checks shape: required keys, types, nullability and,
/// in strict mode, unknown keys. Endpoint lists that pass the shape check are
/// then parsed entry by entry.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    side: Side,
    config: ValidationConfig,
    validator: Validator,
}

impl CompiledSchema {
    /// Compile the document for `side` under `config`.
    pub fn compile(side: Side, config: ValidationConfig) -> Result<Self> {
        let validator =
            jsonschema::validator_for(&document(side, &config)).map_err(|err| {
                SchemaError::CompileFailed {
                    side,
                    message: err.to_string(),
                }
            })?;
        tracing::debug!(side = %side, strict = config.strict_mode, "schema compiled");

        Ok(Self {
            side,
            config,
            validator,
        })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Violations found in `value`, ordered by field and capped at the
    /// configured limit. Empty means the databag is accepted.
    pub fn violations(&self, value: &Value) -> Vec<Violation> {
        let fields = fields_for(self.side);
        let mut violations: Vec<Violation> = self
            .validator
            .iter_errors(value)
            .flat_map(|err| to_violations(&err, fields))
            .collect();
        let endpoint_violations = endpoint_violations(value, fields, &violations);
        violations.extend(endpoint_violations);

        violations.sort_by(|a, b| field_order(&a.field).cmp(&field_order(&b.field)));
        violations.truncate(self.config.violation_limit());
        violations
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.violations(value).is_empty()
    }
}

pub(crate) fn fields_for(side: Side) -> &'static [FieldSpec] {
    match side {
        Side::Provider => &PROVIDER_FIELDS,
        Side::Requirer => &REQUIRER_FIELDS,
    }
}

fn to_violations(err: &ValidationError<'_>, fields: &[FieldSpec]) -> Vec<Violation> {
    let path = field_path(err.instance_path());
    let found = json_type_name(err.instance());

    let violation = match err.kind() {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map_or_else(|| property.to_string(), str::to_string);
            Violation::new(
                join(&path, &name),
                ViolationKind::MissingField,
                "field is required",
            )
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => {
            return unexpected
                .iter()
                .map(|key| unknown_field(&path, key, fields))
                .collect();
        }
        ValidationErrorKind::FalseSchema => {
            let (parent, key) = path.rsplit_once('.').unwrap_or(("", path.as_str()));
            unknown_field(parent, key, fields)
        }
        ValidationErrorKind::Type { .. } if path.is_empty() => Violation::new(
            path,
            ViolationKind::MalformedDataBag,
            format!("databag must be an object, found {found}"),
        ),
        ValidationErrorKind::Type { .. } if path == APP_KEY => Violation::new(
            path,
            ViolationKind::MalformedDataBag,
            format!("app section must be an object, found {found}"),
        ),
        ValidationErrorKind::Type { kind } => Violation::new(
            path,
            ViolationKind::WrongType,
            format!("expected {}, found {found}", expected_types(kind)),
        ),
        ValidationErrorKind::Pattern { .. } => Violation::new(
            path,
            ViolationKind::InvalidEndpoint,
            "expected comma-separated endpoints with no empty entries",
        ),
        _ => Violation::new(path, ViolationKind::WrongType, err.to_string()),
    };
    vec![violation]
}

/// Parse every endpoint-list field the shape check left alone.
fn endpoint_violations(value: &Value, fields: &[FieldSpec], found: &[Violation]) -> Vec<Violation> {
    let Some(app) = value.get(APP_KEY).and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut violations = Vec::new();
    for spec in fields.iter().filter(|spec| spec.kind == FieldKind::EndpointList) {
        let field = join(APP_KEY, spec.wire_name);
        if found.iter().any(|violation| violation.field == field) {
            continue;
        }
        let Some(Value::String(list)) = app.get(spec.wire_name) else {
            continue;
        };
        violations.extend(invalid_entries(list).into_iter().map(|err| {
            Violation::new(
                format!("{field}[{}]", err.index),
                ViolationKind::InvalidEndpoint,
                format!("{:?} is not a valid endpoint: {}", err.entry, err.source),
            )
        }));
    }
    violations
}

fn unknown_field(parent: &str, key: &str, fields: &[FieldSpec]) -> Violation {
    let hint = if parent == APP_KEY {
        hyphenated_match(fields, key)
    } else {
        None
    };
    let message = match hint {
        Some(spec) => format!("unknown field; did you mean {:?}?", spec.wire_name),
        None => "unknown field".to_string(),
    };
    Violation::new(join(parent, key), ViolationKind::UnknownField, message)
}

/// Render an instance location as `app.requested-secrets[1]`.
fn field_path(location: &Location) -> String {
    let mut path = String::new();
    for segment in location {
        match segment {
            LocationSegment::Property(name) => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&name);
            }
            LocationSegment::Index(index) => path.push_str(&format!("[{index}]")),
        }
    }
    path
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Sort key keeping list indexes in numeric order.
fn field_order(field: &str) -> (&str, usize) {
    match field.split_once('[') {
        Some((name, rest)) => (
            name,
            rest.trim_end_matches(']').parse().unwrap_or(usize::MAX),
        ),
        None => (field, 0),
    }
}

fn expected_types(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Single(ty) => ty.to_string(),
        TypeKind::Multiple(types) => types
            .iter()
            .map(|ty| ty.to_string())
            .collect::<Vec<_>>()
            .join(" or "),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn strict() -> ValidationConfig {
        ValidationConfig {
            strict_mode: true,
            ..ValidationConfig::default()
        }
    }

    fn provider(config: ValidationConfig) -> CompiledSchema {
        CompiledSchema::compile(Side::Provider, config).expect("provider schema should compile")
    }

    fn requirer(config: ValidationConfig) -> CompiledSchema {
        CompiledSchema::compile(Side::Requirer, config).expect("requirer schema should compile")
    }

    fn fields(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn compiles_every_side_and_mode() {
        for side in [Side::Provider, Side::Requirer] {
            for config in [ValidationConfig::default(), strict()] {
                let schema = CompiledSchema::compile(side, config).unwrap();
                assert_eq!(schema.side(), side);
                assert_eq!(schema.config(), &config);
            }
        }
    }

    #[test]
    fn maps_missing_and_wrong_type() {
        let schema = requirer(ValidationConfig::default());
        let violations = schema.violations(&json!({"app": {
            "database": 7,
            "requested-secrets": ["a", 1, true],
            "secret-mtls": null
        }}));

        assert_eq!(
            fields(&violations),
            vec![
                "app.database",
                "app.requested-secrets[1]",
                "app.requested-secrets[2]"
            ]
        );
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::WrongType));
        assert_eq!(violations[0].message, "expected string, found number");

        let violations = schema.violations(&json!({"app": {"database": "/a"}}));
        assert_eq!(
            fields(&violations),
            vec!["app.requested-secrets", "app.secret-mtls"]
        );
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::MissingField));
    }

    #[test]
    fn null_is_rejected_for_non_nullable_fields() {
        let schema = requirer(ValidationConfig::default());
        let violations = schema.violations(&json!({"app": {
            "database": "/a",
            "requested-secrets": null,
            "secret-mtls": null
        }}));
        assert_eq!(fields(&violations), vec!["app.requested-secrets"]);
        assert_eq!(violations[0].message, "expected array, found null");
    }

    #[test]
    fn malformed_levels_are_classified() {
        let schema = provider(ValidationConfig::default());

        let violations = schema.violations(&json!(["app"]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "");
        assert_eq!(violations[0].kind, ViolationKind::MalformedDataBag);

        let violations = schema.violations(&json!({"app": "x"}));
        assert_eq!(fields(&violations), vec!["app"]);
        assert_eq!(violations[0].kind, ViolationKind::MalformedDataBag);
        assert_eq!(
            violations[0].message,
            "app section must be an object, found string"
        );
    }

    #[test]
    fn endpoint_entries_are_checked_after_shape() {
        let schema = provider(ValidationConfig::default());
        let bag = |endpoints: Value| {
            json!({"app": {
                "database": "/x",
                "endpoints": endpoints,
                "secret-user": "secret://a/b"
            }})
        };

        assert!(schema.is_valid(&bag(json!("10.0.0.1:2181,10.0.0.2"))));

        let violations = schema.violations(&bag(json!("bad:1,10.0.0.1:2181,10.0.0.2:70000")));
        assert_eq!(
            fields(&violations),
            vec!["app.endpoints[0]", "app.endpoints[2]"]
        );
        assert!(violations
            .iter()
            .all(|v| v.kind == ViolationKind::InvalidEndpoint));

        let violations = schema.violations(&bag(json!("10.0.0.1:2181,")));
        assert_eq!(fields(&violations), vec!["app.endpoints"]);
        assert_eq!(violations[0].kind, ViolationKind::InvalidEndpoint);

        let violations = schema.violations(&bag(json!(["10.0.0.1"])));
        assert_eq!(fields(&violations), vec!["app.endpoints"]);
        assert_eq!(violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn endpoint_indexes_sort_numerically() {
        let schema = provider(ValidationConfig::default());
        let list = vec!["bad"; 12].join(",");
        let violations = schema.violations(&json!({"app": {
            "database": "/x",
            "endpoints": list,
            "secret-user": "secret://a/b"
        }}));
        assert_eq!(violations.len(), 12);
        assert_eq!(violations[2].field, "app.endpoints[2]");
        assert_eq!(violations[11].field, "app.endpoints[11]");
    }

    #[test]
    fn strict_mode_reports_unknown_keys_with_hint() {
        let bag = json!({
            "app": {
                "database": "/x",
                "endpoints": "10.0.0.1:2181",
                "secret_user": "secret://a/b",
                "zzz": 1
            },
            "peers": {}
        });

        let permissive = provider(ValidationConfig::default()).violations(&bag);
        assert_eq!(fields(&permissive), vec!["app.secret-user"]);

        let violations = provider(strict()).violations(&bag);
        assert_eq!(
            fields(&violations),
            vec!["app.secret-user", "app.secret_user", "app.zzz", "peers"]
        );
        assert_eq!(violations[1].kind, ViolationKind::UnknownField);
        assert_eq!(
            violations[1].message,
            "unknown field; did you mean \"secret-user\"?"
        );
        assert_eq!(violations[2].message, "unknown field");
        assert_eq!(violations[3].kind, ViolationKind::UnknownField);
    }

    #[test]
    fn fail_fast_keeps_one_violation_on_every_path() {
        let config = ValidationConfig {
            strict_mode: true,
            fail_fast: true,
            ..ValidationConfig::default()
        };
        let schema = requirer(config);
        let app = json!({
            "database": "/a",
            "requested-secrets": [],
            "secret-mtls": null
        });

        let violations = schema.violations(&json!({"app": app, "x": 1, "y": 2, "z": 3}));
        assert_eq!(fields(&violations), vec!["x"]);

        let violations = schema.violations(&json!({"x": 1, "y": 2}));
        assert_eq!(fields(&violations), vec!["app"]);
        assert_eq!(violations[0].kind, ViolationKind::MissingField);

        let violations = schema.violations(&json!({"app": [], "x": 1}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].kind, ViolationKind::MalformedDataBag);

        let violations = schema.violations(&json!({"app": {}}));
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn violation_cap_applies() {
        let config = ValidationConfig {
            max_reported_violations: 2,
            ..ValidationConfig::default()
        };
        let violations = provider(config).violations(&json!({"app": {}}));
        assert_eq!(fields(&violations), vec!["app.database", "app.endpoints"]);
    }

    #[test]
    fn unit_section_is_unconstrained() {
        let bag = json!({
            "app": {
                "database": "/a",
                "requested-secrets": ["username"],
                "secret-mtls": null
            },
            "unit": {"anything": [1, 2, 3]}
        });
        assert!(requirer(strict()).is_valid(&bag));
    }
}
