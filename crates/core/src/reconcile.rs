//! The reconciliation run.
//!
//! Every triggering event runs the same pipeline to completion:
//!
//! leadership → interface negotiation → image → `kfp-api` validation → render → apply
//!
//! The first failed check sets the unit status and ends the run; the
//! orchestrator is only called once every check has passed.

use crate::gate;
use crate::image::ImageDetails;
use crate::model::{Event, ImageSource, InterfaceSource, Leadership, Orchestrator, StatusSink};
use crate::render;
use crate::status::{CheckFailed, UnitStatus};
use crate::validate::{self, KfpApi, KFP_API};

/// Inputs that passed every dependency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedInputs {
    pub image: ImageDetails,
    pub kfp_api: KfpApi,
}

/// Borrowed collaborators for one or more runs. Holds no state of its own.
pub struct Reconciler<'a> {
    leadership: &'a dyn Leadership,
    interfaces: &'a dyn InterfaceSource,
    image: &'a dyn ImageSource,
    orchestrator: &'a mut dyn Orchestrator,
    status: &'a mut dyn StatusSink,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        leadership: &'a dyn Leadership,
        interfaces: &'a dyn InterfaceSource,
        image: &'a dyn ImageSource,
        orchestrator: &'a mut dyn Orchestrator,
        status: &'a mut dyn StatusSink,
    ) -> Self {
        Self {
            leadership,
            interfaces,
            image,
            orchestrator,
            status,
        }
    }

    /// Run one reconciliation and return the final unit status.
    pub fn reconcile(&mut self, event: Event) -> UnitStatus {
        let span = tracing::info_span!("reconcile", event = %event);
        let _guard = span.enter();

        let inputs = match self.check() {
            Ok(inputs) => inputs,
            Err(failed) => {
                let status = failed.status();
                tracing::info!(status = %status, "dependency check failed");
                self.status.set_status(status.clone());
                return status;
            }
        };

        self.status
            .set_status(UnitStatus::maintenance("Setting pod spec"));
        let spec = render::render(&inputs.image, &inputs.kfp_api.service_name);
        tracing::info!(
            image = %inputs.image.image_path,
            api_service = %inputs.kfp_api.service_name,
            "applying pod spec"
        );
        self.orchestrator.set_spec(spec);

        self.status.set_status(UnitStatus::Active);
        UnitStatus::Active
    }

    /// Run every dependency check in order, stopping at the first failure.
    pub fn check(&self) -> Result<CheckedInputs, CheckFailed> {
        gate::check_leader(self.leadership)?;
        let interfaces = gate::get_interfaces(self.interfaces)?;
        let image = gate::check_image(self.image)?;
        let payload = validate::validate_interface(&interfaces, KFP_API, None)?;
        let kfp_api = KfpApi::from_payload(&payload)?;
        Ok(CheckedInputs { image, kfp_api })
    }
}
