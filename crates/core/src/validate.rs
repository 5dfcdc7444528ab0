//! Interface validation: turns one entry of the negotiated snapshot into a
//! usable payload, or a classified failure.
//!
//! The checks run in a fixed order and each assumes the previous ones passed:
//!
//! 1. relation absent → Blocked (or the caller's default)
//! 2. not a negotiated interface → Blocked
//! 3. schema validation failed → Blocked
//! 4. related but no data yet → Waiting
//! 5. first payload has no keys → Blocked

use kfp_persistence_interface::{EndpointDecl, Interface, Interfaces, Payload};
use serde_json::Value;

use crate::status::CheckFailed;

/// Relation carrying the pipeline API server's service details.
pub const KFP_API: &str = "kfp-api";

/// Relation endpoints this operator declares.
pub fn endpoints() -> Vec<EndpointDecl> {
    vec![EndpointDecl::requires(KFP_API, "k8s-service")]
}

/// Validate the data received on `relation`.
///
/// With `default` set, an unrelated endpoint yields the default instead of
/// failing. Only the first counterpart's payload is considered.
pub fn validate_interface(
    interfaces: &Interfaces,
    relation: &str,
    default: Option<Payload>,
) -> Result<Payload, CheckFailed> {
    let Some(Some(interface)) = interfaces.get(relation) else {
        return match default {
            Some(payload) => Ok(payload),
            None => Err(CheckFailed::blocked(format!(
                "Missing required relation for {}",
                relation
            ))),
        };
    };

    let Interface::Serialized(sdi) = interface else {
        return Err(CheckFailed::blocked(format!(
            "Unexpected error with {} relation data - data not as expected",
            relation
        )));
    };

    let data = sdi.get_data().map_err(|err| {
        tracing::error!(relation, error = %err, "relation data failed schema validation");
        CheckFailed::blocked(format!(
            "Found incomplete/incorrect relation data for {}.  See logs",
            relation
        ))
    })?;

    let Some((counterpart, payload)) = data.into_iter().next() else {
        return Err(CheckFailed::waiting(format!(
            "Waiting for {} relation data",
            relation
        )));
    };

    if payload.is_empty() {
        return Err(CheckFailed::blocked(format!(
            "Found incomplete/incorrect relation data for {}.",
            relation
        )));
    }

    tracing::debug!(
        relation,
        app = %counterpart.app,
        relation_id = counterpart.relation_id,
        version = sdi.version(),
        "using relation data"
    );
    Ok(payload)
}

/// Service details published on the `kfp-api` relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KfpApi {
    pub service_name: String,
    pub service_port: Option<String>,
}

impl KfpApi {
    pub fn from_payload(payload: &Payload) -> Result<Self, CheckFailed> {
        let service_name = match payload.get("service-name") {
            Some(Value::String(name)) => name.clone(),
            _ => {
                tracing::error!(relation = KFP_API, "payload has no usable service-name");
                return Err(CheckFailed::blocked(format!(
                    "Found incomplete/incorrect relation data for {}.  See logs",
                    KFP_API
                )));
            }
        };
        let service_port = payload
            .get("service-port")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Ok(Self {
            service_name,
            service_port,
        })
    }
}
