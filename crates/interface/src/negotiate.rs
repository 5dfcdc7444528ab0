//! Version negotiation across related applications.

use std::collections::BTreeMap;

use crate::error::NegotiationError;
use crate::relation::{
    EndpointDecl, Interface, Interfaces, RelationData, SerializedDataInterface,
    SUPPORTED_VERSIONS_KEY,
};
use crate::schema::{version_rank, SchemaRegistry};

/// Build the interface snapshot for every declared endpoint.
///
/// `relations` maps relation name to the relations currently established on
/// it. An endpoint with no relations maps to `None`; an endpoint whose
/// interface has no registered schema maps to [`Interface::Unversioned`].
pub fn get_interfaces(
    decls: &[EndpointDecl],
    registry: &SchemaRegistry,
    relations: &BTreeMap<String, Vec<RelationData>>,
) -> Result<Interfaces, NegotiationError> {
    let mut interfaces = Interfaces::new();

    for decl in decls {
        let established = relations
            .get(&decl.relation)
            .filter(|rels| !rels.is_empty());
        let Some(established) = established else {
            interfaces.insert(decl.relation.clone(), None);
            continue;
        };

        let Some(schema) = registry.get(&decl.interface) else {
            interfaces.insert(
                decl.relation.clone(),
                Some(Interface::Unversioned {
                    interface: decl.interface.clone(),
                }),
            );
            continue;
        };

        let version = negotiate_version(&decl.relation, &schema.versions(), established)?;
        interfaces.insert(
            decl.relation.clone(),
            Some(Interface::Serialized(SerializedDataInterface::new(
                decl.relation.clone(),
                version,
                decl.role,
                schema.clone(),
                established.clone(),
            ))),
        );
    }

    Ok(interfaces)
}

/// Pick the highest version supported locally and by every remote application.
pub fn negotiate_version(
    relation: &str,
    ours: &[String],
    relations: &[RelationData],
) -> Result<String, NegotiationError> {
    let mut common: Vec<String> = ours.to_vec();
    let mut theirs_all: Vec<String> = Vec::new();

    for rel in relations {
        let theirs = remote_versions(relation, rel)?;
        common.retain(|v| theirs.contains(v));
        for v in theirs {
            if !theirs_all.contains(&v) {
                theirs_all.push(v);
            }
        }
    }

    common
        .into_iter()
        .max_by(|a, b| version_rank(a).cmp(&version_rank(b)))
        .ok_or_else(|| NegotiationError::NoCompatibleVersions {
            relation: relation.to_string(),
            ours: ours.to_vec(),
            theirs: theirs_all,
        })
}

fn remote_versions(relation: &str, rel: &RelationData) -> Result<Vec<String>, NegotiationError> {
    let raw = rel
        .app_data
        .get(SUPPORTED_VERSIONS_KEY)
        .ok_or_else(|| NegotiationError::NoVersionsListed {
            relation: relation.to_string(),
            app: rel.app.clone(),
        })?;

    let versions: Vec<String> =
        serde_json::from_str(raw).map_err(|e| NegotiationError::MalformedVersions {
            relation: relation.to_string(),
            app: rel.app.clone(),
            reason: e.to_string(),
        })?;

    if versions.is_empty() {
        return Err(NegotiationError::NoVersionsListed {
            relation: relation.to_string(),
            app: rel.app.clone(),
        });
    }
    Ok(versions)
}
