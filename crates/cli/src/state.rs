//! Unit state file for `kfp-persistence reconcile`.
//!
//! The state file stands in for the hosting runtime's model: leadership,
//! attached resources, and the relations established with other
//! applications, including each remote application's databag.
//!
//! # Example
//!
//! ```toml
//! [unit]
//! name = "kfp-persistence/0"
//! leader = true
//!
//! [resources]
//! oci-image = "oci-image.json"
//!
//! [[relations.kfp-api]]
//! id = 3
//! app = "kfp-api"
//!
//! [relations.kfp-api.app-data]
//! _supported_versions = '["v1"]'
//! data = '{"service-name": "ml-pipeline", "service-port": "8888"}'
//! ```
//!
//! Resource paths are resolved relative to the state file's directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kfp_persistence_core::{InterfaceSource, Leadership, OciImageResource};
use kfp_persistence_interface::{
    get_interfaces, EndpointDecl, Interfaces, NegotiationError, RelationData, SchemaRegistry,
};
use serde::{Deserialize, Serialize};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Top-level state file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitState {
    pub unit: UnitSettings,
    /// Attached resources, keyed by resource name, valued by file path.
    #[serde(default)]
    pub resources: BTreeMap<String, PathBuf>,
    /// Established relations, keyed by relation name.
    #[serde(default)]
    pub relations: BTreeMap<String, Vec<RelationData>>,
}

/// `[unit]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSettings {
    pub name: String,
    #[serde(default)]
    pub leader: bool,
}

/// A loaded state file, ready to back one reconciliation run.
pub struct StateModel {
    state: UnitState,
    base_dir: PathBuf,
    registry: SchemaRegistry,
    endpoints: Vec<EndpointDecl>,
}

// ── Functions ─────────────────────────────────────────────────────────────────

/// Read and parse a state file from `path`.
///
/// Returns a human-readable error string on failure.
pub fn read_unit_state(path: &Path) -> Result<UnitState, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;

    toml::from_str(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

impl StateModel {
    pub fn load(path: &Path) -> Result<Self, String> {
        let state = read_unit_state(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let registry = SchemaRegistry::builtin()
            .map_err(|e| format!("internal error: embedded interface schema: {}", e))?;
        tracing::debug!(
            unit = %state.unit.name,
            leader = state.unit.leader,
            relations = state.relations.len(),
            "loaded unit state"
        );
        Ok(Self {
            state,
            base_dir,
            registry,
            endpoints: kfp_persistence_core::endpoints(),
        })
    }

    pub fn unit_name(&self) -> &str {
        &self.state.unit.name
    }

    /// The named image resource; unattached when the state file omits it.
    pub fn image_resource(&self, name: &str) -> OciImageResource {
        let path = self
            .state
            .resources
            .get(name)
            .map(|p| self.base_dir.join(p));
        OciImageResource::new(name, path)
    }
}

impl Leadership for StateModel {
    fn is_leader(&self) -> bool {
        self.state.unit.leader
    }
}

impl InterfaceSource for StateModel {
    fn interfaces(&self) -> Result<Interfaces, NegotiationError> {
        get_interfaces(&self.endpoints, &self.registry, &self.state.relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kfp_persistence_core::{ImageSource, KFP_API};
    use kfp_persistence_interface::Interface;
    use std::fs;
    use tempfile::TempDir;

    const STATE: &str = r#"
[unit]
name = "kfp-persistence/0"
leader = true

[resources]
oci-image = "oci-image.json"

[[relations.kfp-api]]
id = 3
app = "kfp-api"

[relations.kfp-api.app-data]
_supported_versions = '["v1"]'
data = '{"service-name": "ml-pipeline", "service-port": "8888"}'
"#;

    #[test]
    fn parses_example_state() {
        let state: UnitState = toml::from_str(STATE).unwrap();
        assert_eq!(state.unit.name, "kfp-persistence/0");
        assert!(state.unit.leader);
        assert_eq!(state.resources["oci-image"], PathBuf::from("oci-image.json"));
        let rels = &state.relations["kfp-api"];
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].id, 3);
        assert_eq!(rels[0].app_data["_supported_versions"], "[\"v1\"]");
    }

    #[test]
    fn leader_defaults_to_false_and_sections_are_optional() {
        let state: UnitState = toml::from_str("[unit]\nname = \"u/1\"\n").unwrap();
        assert!(!state.unit.leader);
        assert!(state.resources.is_empty());
        assert!(state.relations.is_empty());
    }

    #[test]
    fn missing_unit_section_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "[resources]\n").unwrap();
        let err = read_unit_state(&path).unwrap_err();
        assert!(err.starts_with("could not parse"), "got: {}", err);

        let err = read_unit_state(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.starts_with("could not read"), "got: {}", err);
    }

    #[test]
    fn model_resolves_resources_relative_to_state_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, STATE).unwrap();
        fs::write(
            dir.path().join("oci-image.json"),
            r#"{"registrypath": "repo/img:tag"}"#,
        )
        .unwrap();

        let model = StateModel::load(&path).unwrap();
        assert_eq!(model.unit_name(), "kfp-persistence/0");
        assert!(model.is_leader());
        let image = model.image_resource("oci-image").fetch().unwrap();
        assert_eq!(image.image_path, "repo/img:tag");

        let interfaces = model.interfaces().unwrap();
        assert!(matches!(
            interfaces.get(KFP_API),
            Some(Some(Interface::Serialized(_)))
        ));
    }

    #[test]
    fn unlisted_resource_is_unattached() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(&path, "[unit]\nname = \"u/0\"\n").unwrap();
        let model = StateModel::load(&path).unwrap();
        assert!(model.image_resource("oci-image").fetch().is_err());
    }
}
