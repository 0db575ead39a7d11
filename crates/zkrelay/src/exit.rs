use std::fmt;

use zkrelay_schema::{EndpointListError, SchemaError};

// Exit code constants aligned with rsfulmen/DDR-0002 semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    match err {
        SchemaError::LoadFailed(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        SchemaError::CompileFailed { .. } | SchemaError::SideMismatch { .. } => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
        SchemaError::InvalidJson(_) | SchemaError::ValidationFailed { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn endpoint_error(context: &str, err: EndpointListError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}
