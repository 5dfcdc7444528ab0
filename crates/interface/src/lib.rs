//! kfp-persistence-interface: versioned, schema-validated relation data.
//!
//! Two related applications each publish the interface versions they speak
//! (`_supported_versions`) in their application databag. Negotiation picks the
//! highest version both sides share; payloads published under `data` are then
//! validated against that version's JSON Schema for the publishing side's role.
//!
//! The main entry point is [`get_interfaces`], which turns the declared
//! endpoints plus the currently established relations into an [`Interfaces`]
//! snapshot for one reconciliation run.

pub mod error;
pub mod negotiate;
pub mod relation;
pub mod schema;

pub use error::{NegotiationError, SchemaError, ValidationError};
pub use negotiate::{get_interfaces, negotiate_version};
pub use relation::{
    Counterpart, EndpointDecl, Interface, Interfaces, Payload, RelationData,
    SerializedDataInterface, DATA_KEY, SUPPORTED_VERSIONS_KEY,
};
pub use schema::{InterfaceSchema, Role, SchemaRegistry};
