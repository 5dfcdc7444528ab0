//! Capability traits for the collaborators a reconciliation run talks to,
//! plus the trigger events and in-memory sinks.

use std::fmt;

use kfp_persistence_interface::{Interfaces, NegotiationError};

use crate::image::{ImageDetails, ImageResourceError};
use crate::render::PodSpec;
use crate::status::UnitStatus;

// ──────────────────────────────────────────────
// Events
// ──────────────────────────────────────────────

/// Events that trigger a full reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    Install,
    UpgradeCharm,
    ConfigChanged,
    LeaderElected,
    KfpApiRelationChanged,
}

impl Event {
    pub const ALL: [Event; 5] = [
        Event::Install,
        Event::UpgradeCharm,
        Event::ConfigChanged,
        Event::LeaderElected,
        Event::KfpApiRelationChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Event::Install => "install",
            Event::UpgradeCharm => "upgrade-charm",
            Event::ConfigChanged => "config-changed",
            Event::LeaderElected => "leader-elected",
            Event::KfpApiRelationChanged => "kfp-api-relation-changed",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Capabilities
// ──────────────────────────────────────────────

/// Leadership of this unit within its application.
pub trait Leadership {
    fn is_leader(&self) -> bool;
}

/// Interface negotiation for every declared relation endpoint.
pub trait InterfaceSource {
    fn interfaces(&self) -> Result<Interfaces, NegotiationError>;
}

/// Resolver for the workload image reference.
pub trait ImageSource {
    fn fetch(&self) -> Result<ImageDetails, ImageResourceError>;
}

/// The orchestration platform that accepts the rendered workload spec.
pub trait Orchestrator {
    fn set_spec(&mut self, spec: PodSpec);
}

/// The externally observed unit status. Last writer wins.
pub trait StatusSink {
    fn set_status(&mut self, status: UnitStatus);
}

// ──────────────────────────────────────────────
// In-memory sinks
// ──────────────────────────────────────────────

/// Holds the most recently set status.
#[derive(Debug, Default)]
pub struct MemoryStatus {
    current: Option<UnitStatus>,
}

impl MemoryStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&UnitStatus> {
        self.current.as_ref()
    }
}

impl StatusSink for MemoryStatus {
    fn set_status(&mut self, status: UnitStatus) {
        self.current = Some(status);
    }
}

/// Keeps the most recently applied spec so the caller can hand it on.
#[derive(Debug, Default)]
pub struct MemoryOrchestrator {
    applied: Option<PodSpec>,
}

impl MemoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Option<&PodSpec> {
        self.applied.as_ref()
    }

    pub fn take(&mut self) -> Option<PodSpec> {
        self.applied.take()
    }
}

impl Orchestrator for MemoryOrchestrator {
    fn set_spec(&mut self, spec: PodSpec) {
        self.applied = Some(spec);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageDetails;
    use crate::render::render;

    #[test]
    fn event_names_are_kebab_case() {
        let names: Vec<&str> = Event::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "install",
                "upgrade-charm",
                "config-changed",
                "leader-elected",
                "kfp-api-relation-changed",
            ]
        );
    }

    #[test]
    fn memory_status_keeps_last_write() {
        let mut status = MemoryStatus::new();
        assert!(status.current().is_none());
        status.set_status(UnitStatus::maintenance("Setting pod spec"));
        status.set_status(UnitStatus::Active);
        assert_eq!(status.current(), Some(&UnitStatus::Active));
    }

    #[test]
    fn memory_orchestrator_take_empties() {
        let mut orchestrator = MemoryOrchestrator::new();
        orchestrator.set_spec(render(&ImageDetails::new("repo/img:tag"), "ml-pipeline"));
        assert!(orchestrator.applied().is_some());
        assert!(orchestrator.take().is_some());
        assert!(orchestrator.applied().is_none());
    }
}
