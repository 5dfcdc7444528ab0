use std::path::Path;
use std::process;

use kfp_persistence_core::{Event, MemoryOrchestrator, MemoryStatus, Reconciler, IMAGE_RESOURCE};

use crate::state::StateModel;
use crate::{report_error, OutputFormat};

/// Run one reconciliation against the state file.
///
/// Every classified status (active, waiting, blocked) exits 0; only a state
/// file that cannot be loaded or a spec that cannot be written exits 1.
pub(crate) fn cmd_reconcile(
    state_path: &Path,
    event: Event,
    spec_out: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let model = match StateModel::load(state_path) {
        Ok(m) => m,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };
    let image = model.image_resource(IMAGE_RESOURCE);

    let mut orchestrator = MemoryOrchestrator::new();
    let mut status = MemoryStatus::new();
    let result = {
        let mut reconciler =
            Reconciler::new(&model, &model, &image, &mut orchestrator, &mut status);
        reconciler.reconcile(event)
    };
    tracing::debug!(unit = model.unit_name(), status = %result, "reconciliation finished");

    let spec = orchestrator.take();

    if let (Some(path), Some(spec)) = (spec_out, spec.as_ref()) {
        let pretty = match serde_json::to_string_pretty(spec) {
            Ok(s) => s,
            Err(e) => {
                report_error(&format!("error: serializing pod spec: {}", e), output, quiet);
                process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(path, pretty + "\n") {
            let msg = format!("error: could not write '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }

    match output {
        OutputFormat::Text => {
            println!("{}", result);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "status": result,
                "spec": spec,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}
