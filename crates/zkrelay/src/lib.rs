//! Validation of `zookeeper_client` relation databags.
//!
//! # Crate Structure
//!
//! - [`schema`] — Provider/requirer databag schemas, endpoint parsing and JSON Schema export
//!
//! The `zkrelay` binary (behind the `cli` feature) validates databag files,
//! prints the JSON Schema for either side and inspects endpoint lists.

/// Re-export schema types.
pub mod schema {
    pub use zkrelay_schema::*;
}
