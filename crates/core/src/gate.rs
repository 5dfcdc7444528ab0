//! Dependency gate: leadership, interface negotiation, and image checks.
//!
//! Collaborator errors convert into [`CheckFailed`] here so every check can
//! be chained with `?` by the reconciler.

use kfp_persistence_interface::{Interfaces, NegotiationError};

use crate::image::{ImageDetails, ImageResourceError};
use crate::model::{ImageSource, InterfaceSource, Leadership};
use crate::status::CheckFailed;

impl From<NegotiationError> for CheckFailed {
    fn from(err: NegotiationError) -> Self {
        match err {
            NegotiationError::NoVersionsListed { .. } => CheckFailed::waiting(err.to_string()),
            NegotiationError::NoCompatibleVersions { .. }
            | NegotiationError::MalformedVersions { .. } => CheckFailed::blocked(err.to_string()),
        }
    }
}

impl From<ImageResourceError> for CheckFailed {
    fn from(err: ImageResourceError) -> Self {
        CheckFailed::blocked(err.to_string())
    }
}

/// Only the leader may apply a spec.
pub fn check_leader(leadership: &dyn Leadership) -> Result<(), CheckFailed> {
    if leadership.is_leader() {
        Ok(())
    } else {
        Err(CheckFailed::waiting("Waiting for leadership"))
    }
}

pub fn get_interfaces(source: &dyn InterfaceSource) -> Result<Interfaces, CheckFailed> {
    Ok(source.interfaces()?)
}

pub fn check_image(image: &dyn ImageSource) -> Result<ImageDetails, CheckFailed> {
    Ok(image.fetch()?)
}
