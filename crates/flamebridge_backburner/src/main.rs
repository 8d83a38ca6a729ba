//! Farm re-entry bootstrap binary.
//!
//! The farm invokes this executable with the descriptor-file path recorded
//! at submission time. It stands up a fresh engine bound to the
//! descriptor's execution context and replays the recorded method call;
//! any failure exits non-zero, which the farm reports as a failed job.

use anyhow::Result;
use clap::Parser;
use flamebridge_backburner::bootstrap;
use flamebridge_engine::{Engine, EngineMode, EngineScope, EngineSettings};
use flamebridge_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "flamebridge-backburner",
    about = "Replay a queued flamebridge job descriptor"
)]
struct Args {
    /// Path to the job descriptor written at submission time.
    descriptor: PathBuf,

    /// Log at debug level regardless of environment filters.
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("flamebridge-backburner: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(LogConfig {
        app_name: "flamebridge-backburner",
        debug: args.verbose,
    })?;

    let descriptor = bootstrap::load(&args.descriptor)?;

    let mut settings = EngineSettings::from_env();
    settings.instance_name = descriptor.engine_instance.clone();

    let engine = Engine::with_mode(
        settings,
        descriptor.context.clone(),
        EngineMode::Backburner,
    );
    register_bundled_apps(&engine)?;

    let _scope = EngineScope::activate(engine.clone());
    bootstrap::run(descriptor, &args.descriptor, &engine)
}

/// Registration point for apps bundled with this executable. Integration
/// builds extend this; the stock binary ships none, so a descriptor naming
/// an app the build does not carry fails with `UnknownApp`.
fn register_bundled_apps(_engine: &Engine) -> Result<()> {
    Ok(())
}
