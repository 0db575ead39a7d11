use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::compiled::{json_type_name, CompiledSchema};
use crate::config::ValidationConfig;
use crate::error::{Result, SchemaError, Side};
use crate::field::FieldSpec;
use crate::provider::{ProviderAppData, PROVIDER_FIELDS};
use crate::requirer::{RequirerAppData, REQUIRER_FIELDS};

const APP_KEY: &str = "app";

mod checked {
    use serde_json::Value;

    /// An `app` section that passed [`CompiledSchema`](crate::CompiledSchema)
    /// validation. Only this crate creates one.
    pub struct CheckedApp<'a>(pub(super) &'a Value);
}

use checked::CheckedApp;

/// One side of the relation: a databag holding a single app-scoped record.
///
/// Unit-scoped data is not modeled. A `unit` key in the input is tolerated
/// and dropped. Databags are only built through validation; the types do not
/// implement `Deserialize`.
pub trait DataBagSchema: Sized {
    /// Side this databag is published by.
    const SIDE: Side;

    /// App-scoped record type.
    type App: Serialize;

    /// Field declarations of the app record.
    fn fields() -> &'static [FieldSpec];

    fn app(&self) -> &Self::App;

    #[doc(hidden)]
    fn from_checked(app: CheckedApp<'_>) -> Result<Self>;

    /// Validate a databag of the form `{"app": {...}}`.
    ///
    /// Compiles the schema for every call. [`InterfaceValidator`] keeps
    /// compiled schemas for repeated use.
    ///
    /// [`InterfaceValidator`]: crate::InterfaceValidator
    fn validate(value: &Value, config: &ValidationConfig) -> Result<Self> {
        let schema = CompiledSchema::compile(Self::SIDE, *config)?;
        Self::validate_with(&schema, value)
    }

    /// Validate against a schema already compiled for this side.
    fn validate_with(schema: &CompiledSchema, value: &Value) -> Result<Self> {
        if schema.side() != Self::SIDE {
            return Err(SchemaError::SideMismatch {
                expected: Self::SIDE,
                found: schema.side(),
            });
        }

        let violations = schema.violations(value);
        if !violations.is_empty() {
            tracing::debug!(
                side = %Self::SIDE,
                violations = violations.len(),
                "databag rejected"
            );
            return Err(SchemaError::ValidationFailed {
                side: Self::SIDE,
                violations,
            });
        }

        let app = value.get(APP_KEY).cloned().unwrap_or_default();
        let databag = Self::from_checked(CheckedApp(&app))?;
        tracing::debug!(side = %Self::SIDE, "databag accepted");
        Ok(databag)
    }

    /// Parse JSON text and validate it.
    fn validate_json(payload: &str, config: &ValidationConfig) -> Result<Self> {
        let value: Value = serde_json::from_str(payload)?;
        Self::validate(&value, config)
    }

    /// Validate a raw app databag whose values are all strings.
    fn validate_raw(app: &BTreeMap<String, String>, config: &ValidationConfig) -> Result<Self> {
        Self::validate(&raw_to_databag(app), config)
    }

    /// Wire mapping `{"app": {...}}` for this databag.
    fn to_databag(&self) -> Result<Value> {
        let mut root = Map::new();
        root.insert(APP_KEY.to_string(), serde_json::to_value(self.app())?);
        Ok(Value::Object(root))
    }

    /// App databag as relation data: string keys to string values.
    fn to_raw_databag(&self) -> Result<BTreeMap<String, String>> {
        match serde_json::to_value(self.app())? {
            Value::Object(map) => encode_raw(&map),
            other => Err(SchemaError::LoadFailed(format!(
                "app record serialized to {} instead of an object",
                json_type_name(&other)
            ))),
        }
    }
}

/// The schema for the provider side of the relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSchema {
    pub app: ProviderAppData,
}

impl DataBagSchema for ProviderSchema {
    const SIDE: Side = Side::Provider;
    type App = ProviderAppData;

    fn fields() -> &'static [FieldSpec] {
        &PROVIDER_FIELDS
    }

    fn app(&self) -> &Self::App {
        &self.app
    }

    fn from_checked(app: CheckedApp<'_>) -> Result<Self> {
        Ok(Self {
            app: ProviderAppData::from_checked(app.0)?,
        })
    }
}

/// The schema for the requirer side of the relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirerSchema {
    pub app: RequirerAppData,
}

impl DataBagSchema for RequirerSchema {
    const SIDE: Side = Side::Requirer;
    type App = RequirerAppData;

    fn fields() -> &'static [FieldSpec] {
        &REQUIRER_FIELDS
    }

    fn app(&self) -> &Self::App {
        &self.app
    }

    fn from_checked(app: CheckedApp<'_>) -> Result<Self> {
        Ok(Self {
            app: RequirerAppData::from_checked(app.0)?,
        })
    }
}

/// Wrap a raw app databag as `{"app": {...}}`, decoding its values.
pub fn raw_to_databag(app: &BTreeMap<String, String>) -> Value {
    let mut root = Map::new();
    root.insert(APP_KEY.to_string(), Value::Object(decode_raw(app)));
    Value::Object(root)
}

/// Decode relation data values: JSON text becomes the JSON value it encodes,
/// anything else stays a plain string.
pub fn decode_raw(raw: &BTreeMap<String, String>) -> Map<String, Value> {
    raw.iter()
        .map(|(key, text)| {
            let value = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()));
            (key.clone(), value)
        })
        .collect()
}

/// Encode values for relation data so that [`decode_raw`] restores them.
///
/// Strings are written verbatim unless they would decode as some other JSON
/// value, in which case they are JSON-quoted.
pub fn encode_raw(map: &Map<String, Value>) -> Result<BTreeMap<String, String>> {
    let mut raw = BTreeMap::new();
    for (key, value) in map {
        let text = match value {
            Value::String(text) if decodes_as_plain(text) => text.clone(),
            other => serde_json::to_string(other)?,
        };
        raw.insert(key.clone(), text);
    }
    Ok(raw)
}

fn decodes_as_plain(text: &str) -> bool {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::String(decoded)) => decoded == text,
        Ok(_) => false,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ViolationKind;

    fn provider_bag() -> Value {
        json!({
            "app": {
                "database": "/myappB",
                "endpoints": "10.141.78.133:2181,10.141.78.50:2181",
                "secret-user": "secret://59060ecc/cjqub6vubg2s77p3nio0"
            }
        })
    }

    fn requirer_bag() -> Value {
        json!({
            "app": {
                "database": "/myappA",
                "extra-user-roles": "cdrwa",
                "requested-secrets": ["username", "password", "tls-ca", "uris"],
                "secret-mtls": null
            }
        })
    }

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn provider_schema_wraps_app_record() {
        let schema = ProviderSchema::validate(&provider_bag(), &ValidationConfig::default())
            .unwrap();
        assert_eq!(schema.app.database, "/myappB");
        assert_eq!(ProviderSchema::fields().len(), 4);
    }

    #[test]
    fn missing_app_section_is_rejected() {
        let err = RequirerSchema::validate(&json!({"unit": {}}), &ValidationConfig::default())
            .unwrap_err();
        match err {
            SchemaError::ValidationFailed { side, violations } => {
                assert_eq!(side, Side::Requirer);
                assert_eq!(violations[0].field, "app");
                assert_eq!(violations[0].kind, ViolationKind::MissingField);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn requirer_without_secret_mtls_key_is_never_built() {
        let payload = r#"{"app":{"database":"/a","requested-secrets":[]}}"#;
        let err = RequirerSchema::validate_json(payload, &ValidationConfig::default())
            .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "app.secret-mtls");
        assert_eq!(err.violations()[0].kind, ViolationKind::MissingField);
    }

    #[test]
    fn compiled_schema_serves_only_its_side() {
        let config = ValidationConfig::default();
        let provider = CompiledSchema::compile(Side::Provider, config).unwrap();
        assert!(ProviderSchema::validate_with(&provider, &provider_bag()).is_ok());

        let err = RequirerSchema::validate_with(&provider, &requirer_bag()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::SideMismatch {
                expected: Side::Requirer,
                found: Side::Provider
            }
        ));
    }

    #[test]
    fn fail_fast_caps_top_level_unknown_keys() {
        let config = ValidationConfig {
            strict_mode: true,
            fail_fast: true,
            ..ValidationConfig::default()
        };
        let mut bag = provider_bag();
        bag["x"] = json!(1);
        bag["y"] = json!(2);
        bag["z"] = json!(3);

        let err = ProviderSchema::validate(&bag, &config).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "x");
        assert_eq!(err.violations()[0].kind, ViolationKind::UnknownField);

        let err = ProviderSchema::validate(&json!({"x": 1, "y": 2}), &config).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "app");
    }

    #[test]
    fn non_object_inputs_are_malformed() {
        let config = ValidationConfig::default();
        let err = ProviderSchema::validate(&json!(["app"]), &config).unwrap_err();
        assert_eq!(err.violations()[0].kind, ViolationKind::MalformedDataBag);

        let err = ProviderSchema::validate(&json!({"app": "x"}), &config).unwrap_err();
        assert_eq!(err.violations()[0].field, "app");
        assert_eq!(err.violations()[0].kind, ViolationKind::MalformedDataBag);
    }

    #[test]
    fn unit_section_is_ignored() {
        let mut bag = provider_bag();
        bag["unit"] = json!({"anything": 1});
        let strict = ValidationConfig {
            strict_mode: true,
            ..ValidationConfig::default()
        };
        assert!(ProviderSchema::validate(&bag, &strict).is_ok());

        bag["peers"] = json!({});
        let err = ProviderSchema::validate(&bag, &strict).unwrap_err();
        assert_eq!(err.violations()[0].field, "peers");
    }

    #[test]
    fn invalid_json_text_is_reported() {
        let err = ProviderSchema::validate_json("{not json", &ValidationConfig::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidJson(_)));
    }

    #[test]
    fn raw_databag_decodes_json_values() {
        let bag = raw(&[
            ("database", "/myappA"),
            ("requested-secrets", r#"["username","password"]"#),
            ("secret-mtls", "null"),
        ]);
        let schema = RequirerSchema::validate_raw(&bag, &ValidationConfig::default()).unwrap();
        assert_eq!(schema.app.requested_secrets, vec!["username", "password"]);
        assert_eq!(schema.app.secret_mtls, None);
    }

    #[test]
    fn raw_databag_bare_string_list_is_rejected() {
        let bag = raw(&[
            ("database", "/myappA"),
            ("requested-secrets", "username"),
            ("secret-mtls", "null"),
        ]);
        let err = RequirerSchema::validate_raw(&bag, &ValidationConfig::default()).unwrap_err();
        assert_eq!(err.violations()[0].field, "app.requested-secrets");
        assert_eq!(err.violations()[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn accepted_records_revalidate() {
        let config = ValidationConfig::default();

        let provider = ProviderSchema::validate(&provider_bag(), &config).unwrap();
        let wire = provider.to_databag().unwrap();
        assert_eq!(wire, provider_bag());
        assert_eq!(ProviderSchema::validate(&wire, &config).unwrap(), provider);
        let raw = provider.to_raw_databag().unwrap();
        assert_eq!(ProviderSchema::validate_raw(&raw, &config).unwrap(), provider);

        let requirer = RequirerSchema::validate(&requirer_bag(), &config).unwrap();
        let wire = requirer.to_databag().unwrap();
        assert_eq!(RequirerSchema::validate(&wire, &config).unwrap(), requirer);
        let raw = requirer.to_raw_databag().unwrap();
        assert_eq!(raw["secret-mtls"], "null");
        assert_eq!(RequirerSchema::validate_raw(&raw, &config).unwrap(), requirer);
    }

    #[test]
    fn encode_raw_quotes_ambiguous_strings() {
        let map = match json!({"database": "123", "plain": "/zk", "quoted": "\"x\""}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let raw = encode_raw(&map).unwrap();
        assert_eq!(raw["database"], "\"123\"");
        assert_eq!(raw["plain"], "/zk");
        assert_eq!(raw["quoted"], r#""\"x\"""#);
        assert_eq!(decode_raw(&raw), map);
    }
}
