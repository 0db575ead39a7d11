use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::compiled::CompiledSchema;
use crate::config::ValidationConfig;
use crate::databag::{raw_to_databag, DataBagSchema, ProviderSchema, RequirerSchema};
use crate::error::{Result, SchemaError, Side};

/// How databag input is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// A JSON document `{"app": {...}}` with typed values.
    #[default]
    Json,
    /// A flat JSON object of string values, as stored in relation data.
    Raw,
}

/// A databag accepted for one side of the relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidatedDataBag {
    Provider(ProviderSchema),
    Requirer(RequirerSchema),
}

impl ValidatedDataBag {
    pub fn side(&self) -> Side {
        match self {
            ValidatedDataBag::Provider(_) => Side::Provider,
            ValidatedDataBag::Requirer(_) => Side::Requirer,
        }
    }

    /// Wire mapping `{"app": {...}}`.
    pub fn to_databag(&self) -> Result<Value> {
        match self {
            ValidatedDataBag::Provider(schema) => schema.to_databag(),
            ValidatedDataBag::Requirer(schema) => schema.to_databag(),
        }
    }
}

/// Validates provider and requirer databags under one configuration.
///
/// Both sides' schemas are compiled once, when the validator is built.
#[derive(Debug, Clone)]
pub struct InterfaceValidator {
    config: ValidationConfig,
    provider: CompiledSchema,
    requirer: CompiledSchema,
}

impl InterfaceValidator {
    /// Create a validator with default config.
    pub fn new() -> Result<Self> {
        Self::with_config(ValidationConfig::default())
    }

    /// Create a validator with explicit config.
    pub fn with_config(config: ValidationConfig) -> Result<Self> {
        Ok(Self {
            config,
            provider: CompiledSchema::compile(Side::Provider, config)?,
            requirer: CompiledSchema::compile(Side::Requirer, config)?,
        })
    }

    /// Compiled schema used for `side`.
    pub fn schema(&self, side: Side) -> &CompiledSchema {
        match side {
            Side::Provider => &self.provider,
            Side::Requirer => &self.requirer,
        }
    }

    /// Validate a parsed databag.
    pub fn validate_value(&self, side: Side, value: &Value) -> Result<ValidatedDataBag> {
        match side {
            Side::Provider => ProviderSchema::validate_with(&self.provider, value)
                .map(ValidatedDataBag::Provider),
            Side::Requirer => RequirerSchema::validate_with(&self.requirer, value)
                .map(ValidatedDataBag::Requirer),
        }
    }

    /// Validate a raw app databag of string values.
    pub fn validate_raw(
        &self,
        side: Side,
        app: &BTreeMap<String, String>,
    ) -> Result<ValidatedDataBag> {
        self.validate_value(side, &raw_to_databag(app))
    }

    /// Validate JSON bytes in the given input format.
    pub fn validate(
        &self,
        side: Side,
        format: InputFormat,
        payload: &[u8],
    ) -> Result<ValidatedDataBag> {
        if payload.len() > self.config.max_databag_size {
            return Err(SchemaError::LoadFailed(format!(
                "databag too large ({} bytes, max {})",
                payload.len(),
                self.config.max_databag_size
            )));
        }

        match format {
            InputFormat::Json => {
                let value: Value = serde_json::from_slice(payload)?;
                self.validate_value(side, &value)
            }
            InputFormat::Raw => {
                let app: BTreeMap<String, String> = serde_json::from_slice(payload)?;
                self.validate_raw(side, &app)
            }
        }
    }

    /// Read a databag file and validate it.
    ///
    /// Symlinks are refused and reads stop at `max_databag_size`.
    pub fn validate_file(
        &self,
        side: Side,
        format: InputFormat,
        path: &Path,
    ) -> Result<ValidatedDataBag> {
        let payload = self.read_file(path)?;
        self.validate(side, format, &payload)
    }

    /// Read up to `max_databag_size` bytes from `reader` and validate them.
    pub fn validate_reader<R: Read>(
        &self,
        side: Side,
        format: InputFormat,
        reader: R,
    ) -> Result<ValidatedDataBag> {
        let payload = self.read_limited(reader, "input")?;
        self.validate(side, format, &payload)
    }

    /// Get validator configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let metadata = std::fs::symlink_metadata(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            return Err(SchemaError::LoadFailed(format!(
                "refusing to load databag symlink: {}",
                path.display()
            )));
        }
        if !file_type.is_file() {
            return Err(SchemaError::LoadFailed(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > self.config.max_databag_size as u64 {
            return Err(SchemaError::LoadFailed(format!(
                "databag file too large ({} bytes): {}",
                metadata.len(),
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|err| {
            SchemaError::LoadFailed(format!("failed opening {}: {err}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), size = metadata.len(), "reading databag");
        self.read_limited(file, &path.display().to_string())
    }

    fn read_limited<R: Read>(&self, reader: R, name: &str) -> Result<Vec<u8>> {
        let max_bytes = self.config.max_databag_size;
        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut payload = Vec::new();
        reader
            .take(read_limit)
            .read_to_end(&mut payload)
            .map_err(|err| SchemaError::LoadFailed(format!("failed reading {name}: {err}")))?;
        if payload.len() > max_bytes {
            return Err(SchemaError::LoadFailed(format!(
                "databag too large while reading: {name}"
            )));
        }
        Ok(payload)
    }
}
