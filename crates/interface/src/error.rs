/// Version negotiation failures for a relation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NegotiationError {
    /// The remote application has not published `_supported_versions` yet.
    #[error("{app} has not listed any supported versions for {relation}")]
    NoVersionsListed { relation: String, app: String },

    /// Both sides listed versions but share none.
    #[error("no compatible versions for {relation}: ours {ours:?}, theirs {theirs:?}")]
    NoCompatibleVersions {
        relation: String,
        ours: Vec<String>,
        theirs: Vec<String>,
    },

    /// `_supported_versions` is present but is not a JSON list of strings.
    #[error("{app} listed malformed versions for {relation}: {reason}")]
    MalformedVersions {
        relation: String,
        app: String,
        reason: String,
    },
}

/// A counterpart payload that failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid data from {app} on {relation}/{relation_id}: {}", .errors.join("; "))]
pub struct ValidationError {
    pub relation: String,
    pub relation_id: u32,
    pub app: String,
    pub errors: Vec<String>,
}

/// An interface schema document that is not shaped as
/// `{ "<version>": { "provides": <schema>, "requires": <schema> } }`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema document is not valid JSON: {0}")]
    Parse(String),

    #[error("schema document must be an object keyed by version")]
    NotAnObject,

    #[error("version '{version}' is missing the '{role}' schema")]
    MissingRole { version: String, role: &'static str },

    #[error("version '{version}' has an invalid '{role}' schema: {reason}")]
    Compile {
        version: String,
        role: &'static str,
        reason: String,
    },
}
