mod commands;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kfp_persistence_core::observability::{init_logging, LogFormat};
use kfp_persistence_core::{Event, KFP_API};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

/// Trigger event for a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EventArg {
    Install,
    UpgradeCharm,
    ConfigChanged,
    LeaderElected,
    KfpApiRelationChanged,
}

impl From<EventArg> for Event {
    fn from(arg: EventArg) -> Self {
        match arg {
            EventArg::Install => Event::Install,
            EventArg::UpgradeCharm => Event::UpgradeCharm,
            EventArg::ConfigChanged => Event::ConfigChanged,
            EventArg::LeaderElected => Event::LeaderElected,
            EventArg::KfpApiRelationChanged => Event::KfpApiRelationChanged,
        }
    }
}

/// Kubeflow Pipelines persistence agent operator.
#[derive(Parser)]
#[command(
    name = "kfp-persistence",
    version,
    about = "Kubeflow Pipelines persistence agent operator"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Log format on stderr (pretty or json)
    #[arg(long, global = true, default_value = "pretty", value_enum)]
    log_format: LogFormatArg,

    /// Suppress logs and non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation against a unit state file
    Reconcile {
        /// Path to the unit state TOML file
        #[arg(long)]
        state: PathBuf,
        /// Event that triggered this run
        #[arg(long, default_value = "config-changed", value_enum)]
        event: EventArg,
        /// Write the applied pod spec to this file
        #[arg(long)]
        spec_out: Option<PathBuf>,
    },

    /// Render the pod spec for an image and API service name
    Render {
        /// Image reference (registry path)
        #[arg(long)]
        image: String,
        /// Registry username
        #[arg(long)]
        username: Option<String>,
        /// Registry password
        #[arg(long)]
        password: Option<String>,
        /// Service name of the pipeline API server
        #[arg(long)]
        service_name: String,
    },

    /// Negotiate and validate one relation's data
    CheckRelation {
        /// Path to the unit state TOML file
        #[arg(long)]
        state: PathBuf,
        /// Relation name
        #[arg(long, default_value = KFP_API)]
        relation: String,
        /// Treat a missing relation as an empty payload
        #[arg(long)]
        optional: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        });
    }

    match cli.command {
        Commands::Reconcile {
            state,
            event,
            spec_out,
        } => {
            commands::reconcile::cmd_reconcile(
                &state,
                event.into(),
                spec_out.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Render {
            image,
            username,
            password,
            service_name,
        } => {
            commands::render::cmd_render(image, username, password, &service_name, cli.output);
        }
        Commands::CheckRelation {
            state,
            relation,
            optional,
        } => {
            commands::check_relation::cmd_check_relation(
                &state,
                &relation,
                optional,
                cli.output,
                cli.quiet,
            );
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
