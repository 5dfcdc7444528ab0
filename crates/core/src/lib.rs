//! kfp-persistence-core: reconciliation for the Kubeflow Pipelines
//! persistence agent.
//!
//! On every triggering event the [`Reconciler`] re-derives the agent's pod
//! spec from four dependencies (leadership, the negotiated `kfp-api`
//! interface, the OCI image resource, and the relation payload) or stops at
//! the first failed check with a classified [`UnitStatus`].

pub mod gate;
pub mod image;
pub mod model;
pub mod observability;
pub mod reconcile;
pub mod render;
pub mod status;
pub mod validate;

pub use image::{ImageDetails, ImageResourceError, OciImageResource};
pub use model::{
    Event, ImageSource, InterfaceSource, Leadership, MemoryOrchestrator, MemoryStatus,
    Orchestrator, StatusSink,
};
pub use reconcile::{CheckedInputs, Reconciler};
pub use render::{render, PodSpec};
pub use status::{CheckFailed, StatusClass, UnitStatus};
pub use validate::{endpoints, validate_interface, KfpApi, KFP_API};

/// Name of the image resource the agent container runs.
pub const IMAGE_RESOURCE: &str = "oci-image";
