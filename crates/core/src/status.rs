//! Unit status and the classified failures that set it.

use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Externally observed state of this unit. Overwritten by every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    Active,
    Maintenance(String),
    Waiting(String),
    Blocked(String),
}

impl UnitStatus {
    pub fn maintenance(message: impl Into<String>) -> Self {
        UnitStatus::Maintenance(message.into())
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitStatus::Active => "active",
            UnitStatus::Maintenance(_) => "maintenance",
            UnitStatus::Waiting(_) => "waiting",
            UnitStatus::Blocked(_) => "blocked",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UnitStatus::Active => "",
            UnitStatus::Maintenance(m) | UnitStatus::Waiting(m) | UnitStatus::Blocked(m) => m,
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStatus::Active => f.write_str("active"),
            other => write!(f, "{}: {}", other.name(), other.message()),
        }
    }
}

impl Serialize for UnitStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("UnitStatus", 2)?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("message", self.message())?;
        s.end()
    }
}

/// Urgency of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// Expected to resolve on its own; retry on the next event.
    Waiting,
    /// Needs operator intervention.
    Blocked,
}

/// A dependency check that stopped the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CheckFailed {
    pub message: String,
    pub class: StatusClass,
}

impl CheckFailed {
    pub fn waiting(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            class: StatusClass::Waiting,
        }
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            class: StatusClass::Blocked,
        }
    }

    /// The unit status this failure sets.
    pub fn status(&self) -> UnitStatus {
        match self.class {
            StatusClass::Waiting => UnitStatus::Waiting(self.message.clone()),
            StatusClass::Blocked => UnitStatus::Blocked(self.message.clone()),
        }
    }
}
