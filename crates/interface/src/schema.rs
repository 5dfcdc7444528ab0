//! Versioned interface schemas.
//!
//! An interface schema document maps each supported version to a pair of
//! JSON Schemas, one for the data published by the providing side and one
//! for the requiring side:
//!
//! ```json
//! { "v1": { "provides": { ... }, "requires": { ... } } }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::SchemaError;

static K8S_SERVICE_SCHEMA_STR: &str = include_str!("../schemas/k8s-service.json");

/// Which side of a relation an endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Provides,
    Requires,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Provides => "provides",
            Role::Requires => "requires",
        }
    }

    /// The role played by the other end of the relation.
    pub fn opposite(self) -> Role {
        match self {
            Role::Provides => Role::Requires,
            Role::Requires => Role::Provides,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct VersionSchema {
    provides: Value,
    requires: Value,
}

/// All versions of one interface, each with its provides/requires schema.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSchema {
    versions: BTreeMap<String, VersionSchema>,
}

impl InterfaceSchema {
    /// Parse and compile-check a schema document.
    pub fn from_json(doc: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(doc).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let Value::Object(entries) = value else {
            return Err(SchemaError::NotAnObject);
        };

        let mut versions = BTreeMap::new();
        for (version, body) in entries {
            let provides = role_schema(&version, &body, Role::Provides)?;
            let requires = role_schema(&version, &body, Role::Requires)?;
            versions.insert(version, VersionSchema { provides, requires });
        }
        Ok(Self { versions })
    }

    /// The built-in `k8s-service` interface (service name + port).
    pub fn k8s_service() -> Result<Self, SchemaError> {
        Self::from_json(K8S_SERVICE_SCHEMA_STR)
    }

    /// Versions this side can speak, in ascending order.
    pub fn versions(&self) -> Vec<String> {
        let mut versions: Vec<String> = self.versions.keys().cloned().collect();
        versions.sort_by(|a, b| version_rank(a).cmp(&version_rank(b)));
        versions
    }

    /// Validate `instance` against the schema for `role` at `version`.
    ///
    /// Returns every validation message; an empty list means valid.
    pub fn validate(&self, version: &str, role: Role, instance: &Value) -> Vec<String> {
        let Some(entry) = self.versions.get(version) else {
            return vec![format!("unsupported interface version '{}'", version)];
        };
        let schema = match role {
            Role::Provides => &entry.provides,
            Role::Requires => &entry.requires,
        };
        match jsonschema::validator_for(schema) {
            Ok(validator) => validator
                .iter_errors(instance)
                .map(|e| format!("{}", e))
                .collect(),
            Err(e) => vec![format!("schema failed to compile: {}", e)],
        }
    }
}

fn role_schema(version: &str, body: &Value, role: Role) -> Result<Value, SchemaError> {
    let schema = body
        .get(role.as_str())
        .cloned()
        .ok_or_else(|| SchemaError::MissingRole {
            version: version.to_string(),
            role: role.as_str(),
        })?;
    jsonschema::validator_for(&schema).map_err(|e| SchemaError::Compile {
        version: version.to_string(),
        role: role.as_str(),
        reason: e.to_string(),
    })?;
    Ok(schema)
}

/// Ordering key for version labels: `v2` < `v10`, non-numeric labels sort first.
pub(crate) fn version_rank(version: &str) -> (Option<u64>, &str) {
    let numeric = version
        .strip_prefix('v')
        .and_then(|n| n.parse::<u64>().ok());
    (numeric, version)
}

/// Interface schemas keyed by interface name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, InterfaceSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every interface this operator ships a schema for.
    pub fn builtin() -> Result<Self, SchemaError> {
        let mut registry = Self::new();
        registry.register("k8s-service", InterfaceSchema::k8s_service()?);
        Ok(registry)
    }

    pub fn register(&mut self, interface: impl Into<String>, schema: InterfaceSchema) {
        self.schemas.insert(interface.into(), schema);
    }

    pub fn get(&self, interface: &str) -> Option<&InterfaceSchema> {
        self.schemas.get(interface)
    }
}
