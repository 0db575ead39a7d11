use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Endpoints;
use crate::error::Result;
use crate::field::{FieldKind, FieldSpec, Presence};

pub const DATABASE: FieldSpec = FieldSpec {
    wire_name: "database",
    kind: FieldKind::Text,
    presence: Presence::Required,
    title: "zNode",
    description: "The parent chroot zNode granted to the requirer",
    example: r#""/myappB""#,
};

pub const ENDPOINTS: FieldSpec = FieldSpec {
    wire_name: "endpoints",
    kind: FieldKind::EndpointList,
    presence: Presence::Required,
    title: "ZooKeeper endpoints",
    description: "A comma-separated list of ZooKeeper servers and ports",
    example: r#""10.141.78.133:2181,10.141.78.50:2181,10.141.78.45:2181""#,
};

pub const SECRET_USER: FieldSpec = FieldSpec {
    wire_name: "secret-user",
    kind: FieldKind::Text,
    presence: Presence::Required,
    title: "Credentials Secret Name",
    description: "Reference to the secret holding the client credentials",
    example: r#""secret://59060ecc-0495-4a80-8006-5f1fc13fd783/cjqub6vubg2s77p3nio0""#,
};

pub const SECRET_TLS: FieldSpec = FieldSpec {
    wire_name: "secret-tls",
    kind: FieldKind::Text,
    presence: Presence::Optional,
    title: "TLS Secret Name",
    description: "Reference to the TLS secret. When absent the client is configured with TLS disabled.",
    example: r#""secret://59060ecc-0495-4a80-8006-5f1fc13fd783/cjqub7fubg2s77p3niog""#,
};

/// Provider app databag fields, in wire order.
pub const PROVIDER_FIELDS: [FieldSpec; 4] = [DATABASE, ENDPOINTS, SECRET_USER, SECRET_TLS];

/// What the ZooKeeper side publishes to a client application.
///
/// Obtained from [`ProviderSchema`](crate::ProviderSchema) validation or
/// built directly; there is no unchecked deserialization path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderAppData {
    /// zNode granted to the requirer, e.g. `/myappB`.
    pub database: String,
    pub endpoints: Endpoints,
    #[serde(rename = "secret-user")]
    pub secret_user: String,
    #[serde(rename = "secret-tls", skip_serializing_if = "Option::is_none")]
    pub secret_tls: Option<String>,
}

#[derive(Deserialize)]
struct ProviderWire {
    database: String,
    endpoints: Endpoints,
    #[serde(rename = "secret-user")]
    secret_user: String,
    #[serde(rename = "secret-tls", default)]
    secret_tls: Option<String>,
}

impl ProviderAppData {
    /// Whether the provider advertises a TLS secret.
    pub fn tls_enabled(&self) -> bool {
        self.secret_tls.is_some()
    }

    /// Build the record from an `app` object the compiled schema accepted.
    pub(crate) fn from_checked(app: &Value) -> Result<Self> {
        let wire = ProviderWire::deserialize(app)?;
        Ok(Self {
            database: wire.database,
            endpoints: wire.endpoints,
            secret_user: wire.secret_user,
            secret_tls: wire.secret_tls,
        })
    }
}
