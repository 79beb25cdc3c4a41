use std::fs::OpenOptions;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use error_stack::Report;
use error_stack::ResultExt;
use thiserror::Error;
use utils::logging;
use utils::version;
use virt_monitor::backend::VirshProvider;
use virt_monitor::config::Cli;
use virt_monitor::metrics;
use virt_monitor::metrics::encoders::create_encoder;
use virt_monitor::Monitor;

#[derive(Debug, Error)]
enum AppError {
    #[error("Collection failed for {target}")]
    Collection { target: String },
    #[error("Failed to write report to {destination}")]
    Output { destination: String },
}

/// Sets up global panic hooks.
fn setup_global_hooks() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        default_hook(panic_info);
        tracing::error!("Thread panicked: {}", panic_info);
    }));
}

fn main() -> ExitCode {
    setup_global_hooks();

    let cli = Cli::parse();
    logging::init(logging::level_from_verbosity(cli.verbose));

    tracing::info!("Starting virt-monitor {}", &**version::VERSION);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            tracing::error!("{report:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Report<AppError>> {
    let provider = VirshProvider::new(&cli.virsh, &cli.uri);
    let monitor = Monitor::new(provider, &cli.target);

    let report = monitor.collect().change_context(AppError::Collection {
        target: cli.target.clone(),
    })?;

    let encoder = create_encoder(cli.format);
    let encoded = encoder.encode_domain_report(monitor.target_id(), &report, metrics::current_time());

    match &cli.output {
        Some(path) => {
            let destination = path.display().to_string();
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(encoded.as_bytes()))
                .change_context(AppError::Output { destination })?;
        }
        None => {
            std::io::stdout()
                .lock()
                .write_all(encoded.as_bytes())
                .change_context(AppError::Output {
                    destination: "stdout".to_string(),
                })?;
        }
    }

    Ok(())
}
