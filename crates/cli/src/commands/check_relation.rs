use std::path::Path;
use std::process;

use kfp_persistence_core::{gate, validate_interface};
use kfp_persistence_interface::Payload;

use crate::state::StateModel;
use crate::{report_error, OutputFormat};

/// Negotiate interfaces and validate one relation, printing its payload.
///
/// Exits 1 when the relation is not usable, printing the status it would set.
pub(crate) fn cmd_check_relation(
    state_path: &Path,
    relation: &str,
    optional: bool,
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

    let default = optional.then(Payload::new);
    let result = gate::get_interfaces(&model)
        .and_then(|interfaces| validate_interface(&interfaces, relation, default));

    match result {
        Ok(payload) => match output {
            OutputFormat::Text => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&payload).unwrap_or_default()
                );
            }
            OutputFormat::Json => {
                let json = serde_json::json!({ "relation": relation, "data": payload });
                println!("{}", json);
            }
        },
        Err(failed) => {
            let status = failed.status();
            if !quiet {
                match output {
                    OutputFormat::Text => println!("{}", status),
                    OutputFormat::Json => {
                        let json = serde_json::json!({ "relation": relation, "status": status });
                        println!("{}", json);
                    }
                }
            }
            process::exit(1);
        }
    }
}
