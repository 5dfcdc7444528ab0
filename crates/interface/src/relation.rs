//! Relation endpoints, remote databags, and schema-validated reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::schema::{InterfaceSchema, Role};

/// Databag key holding the remote application's supported versions.
pub const SUPPORTED_VERSIONS_KEY: &str = "_supported_versions";

/// Databag key holding the remote application's serialized payload.
pub const DATA_KEY: &str = "data";

/// A validated relation payload: string keys to JSON values.
pub type Payload = Map<String, Value>;

/// Local declaration of a relation endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDecl {
    /// Relation (channel) name, e.g. `kfp-api`.
    pub relation: String,
    /// Interface name used to look up the schema, e.g. `k8s-service`.
    pub interface: String,
    /// The role this side plays on the relation.
    pub role: Role,
}

impl EndpointDecl {
    pub fn requires(relation: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            interface: interface.into(),
            role: Role::Requires,
        }
    }
}

/// One established relation and the remote application's databag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelationData {
    pub id: u32,
    pub app: String,
    #[serde(default)]
    pub app_data: BTreeMap<String, String>,
}

/// Identity of the remote side of one relation.
///
/// Ordered by relation id, then application name, so the first counterpart
/// of a read is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Counterpart {
    pub relation_id: u32,
    pub app: String,
}

/// A negotiated, schema-versioned data channel.
#[derive(Debug, Clone)]
pub struct SerializedDataInterface {
    relation: String,
    version: String,
    role: Role,
    schema: InterfaceSchema,
    relations: Vec<RelationData>,
}

impl SerializedDataInterface {
    pub fn new(
        relation: impl Into<String>,
        version: impl Into<String>,
        role: Role,
        schema: InterfaceSchema,
        relations: Vec<RelationData>,
    ) -> Self {
        Self {
            relation: relation.into(),
            version: version.into(),
            role,
            schema,
            relations,
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// The negotiated version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Read and validate every counterpart's payload.
    ///
    /// Relations whose remote side has not published `data` yet are skipped.
    /// An empty object is returned as-is without schema validation.
    pub fn get_data(&self) -> Result<BTreeMap<Counterpart, Payload>, ValidationError> {
        let remote_role = self.role.opposite();
        let mut out = BTreeMap::new();

        for rel in &self.relations {
            let Some(raw) = rel.app_data.get(DATA_KEY) else {
                continue;
            };
            let invalid = |errors: Vec<String>| ValidationError {
                relation: self.relation.clone(),
                relation_id: rel.id,
                app: rel.app.clone(),
                errors,
            };

            let value: Value = serde_json::from_str(raw)
                .map_err(|e| invalid(vec![format!("data is not valid JSON: {}", e)]))?;
            let Value::Object(payload) = value else {
                return Err(invalid(vec!["data must be a JSON object".to_string()]));
            };

            if !payload.is_empty() {
                let instance = Value::Object(payload.clone());
                let errors = self.schema.validate(&self.version, remote_role, &instance);
                if !errors.is_empty() {
                    return Err(invalid(errors));
                }
            }

            out.insert(
                Counterpart {
                    relation_id: rel.id,
                    app: rel.app.clone(),
                },
                payload,
            );
        }

        Ok(out)
    }
}

/// Negotiation result for one relation endpoint.
#[derive(Debug, Clone)]
pub enum Interface {
    /// A schema-versioned interface with an agreed version.
    Serialized(SerializedDataInterface),
    /// The endpoint is related, but its interface has no registered schema.
    Unversioned { interface: String },
}

/// Snapshot of every declared endpoint: `None` when nothing is related.
pub type Interfaces = BTreeMap<String, Option<Interface>>;
