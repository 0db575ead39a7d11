use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::field::{FieldKind, FieldSpec, Presence};

pub const DATABASE: FieldSpec = FieldSpec {
    wire_name: "database",
    kind: FieldKind::Text,
    presence: Presence::Required,
    title: "zNode",
    description: "The parent chroot zNode requested by the requirer",
    example: r#""/myappA""#,
};

pub const EXTRA_USER_ROLES: FieldSpec = FieldSpec {
    wire_name: "extra-user-roles",
    kind: FieldKind::Text,
    presence: Presence::Optional,
    title: "User roles",
    description: "ACL string representation for the parent chroot",
    example: r#""cdrwa""#,
};

pub const REQUESTED_SECRETS: FieldSpec = FieldSpec {
    wire_name: "requested-secrets",
    kind: FieldKind::TextList,
    presence: Presence::Required,
    title: "Requested secrets",
    description: "Provider fields to be transferred as secrets",
    example: r#"["username", "password", "tls-ca", "uris"]"#,
};

pub const SECRET_MTLS: FieldSpec = FieldSpec {
    wire_name: "secret-mtls",
    kind: FieldKind::Text,
    presence: Presence::RequiredNullable,
    title: "mTLS Secret Name",
    description: "Reference to the mTLS secret. Null configures the provider without mTLS.",
    example: r#""secret://59060ecc-0495-4a80-8006-5f1fc13fd783/cjqub7fubg2s77p3niog""#,
};

/// Requirer app databag fields, in wire order.
pub const REQUIRER_FIELDS: [FieldSpec; 4] =
    [DATABASE, EXTRA_USER_ROLES, REQUESTED_SECRETS, SECRET_MTLS];

/// What a client application asks of ZooKeeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirerAppData {
    /// Requested zNode, e.g. `/myappA`.
    pub database: String,
    /// ACL permissions on the zNode, e.g. `cdrwa`.
    #[serde(rename = "extra-user-roles", skip_serializing_if = "Option::is_none")]
    pub extra_user_roles: Option<String>,
    #[serde(rename = "requested-secrets")]
    pub requested_secrets: Vec<String>,
    // Always serialized: the key is required even when the value is null.
    #[serde(rename = "secret-mtls")]
    pub secret_mtls: Option<String>,
}

#[derive(Deserialize)]
struct RequirerWire {
    database: String,
    #[serde(rename = "extra-user-roles", default)]
    extra_user_roles: Option<String>,
    #[serde(rename = "requested-secrets")]
    requested_secrets: Vec<String>,
    #[serde(rename = "secret-mtls")]
    secret_mtls: Option<String>,
}

impl RequirerAppData {
    pub fn mtls_enabled(&self) -> bool {
        self.secret_mtls.is_some()
    }

    /// Whether `field` was requested to be transferred as a secret.
    pub fn requests_secret(&self, field: &str) -> bool {
        self.requested_secrets.iter().any(|name| name == field)
    }

    /// Build the record from an `app` object the compiled schema accepted.
    pub(crate) fn from_checked(app: &Value) -> Result<Self> {
        let wire = RequirerWire::deserialize(app)?;
        Ok(Self {
            database: wire.database,
            extra_user_roles: wire.extra_user_roles,
            requested_secrets: wire.requested_secrets,
            secret_mtls: wire.secret_mtls,
        })
    }
}
