//! Provider and requirer databag schemas for the `zookeeper_client` relation.
//!
//! The provider publishes the zNode it granted, a comma-separated endpoint
//! list and secret references. The requirer publishes the zNode it wants,
//! optional extra ACL roles, the fields it wants as secrets and an optional
//! mTLS secret.
//!
//! Validation is a gate: a databag is either accepted whole or rejected with
//! every violation found (or the first one, with `fail_fast`). Shape is
//! checked by the JSON Schema document generated for each side, compiled with
//! `jsonschema`; endpoint lists are then parsed entry by entry.

pub mod compiled;
pub mod config;
pub mod databag;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod field;
pub mod provider;
pub mod requirer;
pub mod validator;

pub use compiled::CompiledSchema;
pub use config::ValidationConfig;
pub use databag::{DataBagSchema, ProviderSchema, RequirerSchema};
pub use document::document;
pub use endpoint::{Endpoint, Endpoints};
pub use error::{
    EndpointError, EndpointListError, Result, SchemaError, Side, Violation, ViolationKind,
};
pub use provider::ProviderAppData;
pub use requirer::RequirerAppData;
pub use validator::{InputFormat, InterfaceValidator, ValidatedDataBag};
