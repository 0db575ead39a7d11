use std::fmt;
use std::net::AddrParseError;
use std::num::ParseIntError;

use serde::Serialize;

/// Which side of the relation a databag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Provider,
    Requirer,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Provider => "provider",
            Side::Requirer => "requirer",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while parsing a single `ip[:port]` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// The address part is not an IPv4 or IPv6 literal.
    #[error("invalid IP address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: AddrParseError,
    },

    /// A `[` opened an IPv6 literal that was never closed.
    #[error("unterminated IPv6 bracket in {0:?}")]
    UnclosedBracket(String),

    /// Characters follow a bracketed address without a `:` separator.
    #[error("unexpected {0:?} after bracketed address")]
    TrailingCharacters(String),

    /// The port part is not an integer.
    #[error("port {port:?} is not an integer: {source}")]
    PortNotNumeric { port: String, source: ParseIntError },

    /// The port part is an integer outside 0..=65535.
    #[error("port {0} is out of range 0..=65535")]
    PortOutOfRange(String),
}

/// A comma-separated endpoint list with at least one malformed entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("endpoint {index} ({entry:?}) is malformed: {source}")]
pub struct EndpointListError {
    /// Zero-based position of the entry in the list.
    pub index: usize,
    pub entry: String,
    pub source: EndpointError,
}

/// Classification of a single field violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The databag, or its `app` section, is not a JSON object.
    MalformedDataBag,
    /// A required key is absent.
    MissingField,
    /// A key is present with the wrong JSON type.
    WrongType,
    /// An `endpoints` entry failed to parse.
    InvalidEndpoint,
    /// A key outside the schema, reported in strict mode only.
    UnknownField,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::MalformedDataBag => "malformed_databag",
            ViolationKind::MissingField => "missing_field",
            ViolationKind::WrongType => "wrong_type",
            ViolationKind::InvalidEndpoint => "invalid_endpoint",
            ViolationKind::UnknownField => "unknown_field",
        }
    }
}

/// One reason a databag was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Wire path of the offending value, e.g. `app.endpoints[1]`.
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur while loading or validating a databag.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The databag file could not be read.
    #[error("failed to load databag: {0}")]
    LoadFailed(String),

    /// The generated JSON Schema document could not be compiled.
    #[error("failed to compile {side} schema: {message}")]
    CompileFailed { side: Side, message: String },

    /// A compiled schema was used for the other side's databag.
    #[error("schema compiled for the {found} side cannot validate a {expected} databag")]
    SideMismatch { expected: Side, found: Side },

    /// The payload is not valid JSON.
    #[error("databag is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The databag does not satisfy the schema for its side.
    #[error("{side} databag rejected: {}", summarize(.violations))]
    ValidationFailed {
        side: Side,
        violations: Vec<Violation>,
    },
}

impl SchemaError {
    /// Violations carried by a rejected databag, empty for other errors.
    pub fn violations(&self) -> &[Violation] {
        match self {
            SchemaError::ValidationFailed { violations, .. } => violations,
            _ => &[],
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    let mut iter = violations.iter();
    let Some(first) = iter.next() else {
        return "no violations recorded".to_string();
    };

    let mut message = first.to_string();
    for violation in iter.by_ref().take(3) {
        message.push_str("; ");
        message.push_str(&violation.to_string());
    }
    let remaining = iter.count();
    if remaining > 0 {
        message.push_str(&format!("; and {remaining} more"));
    }
    message
}

pub type Result<T> = std::result::Result<T, SchemaError>;
