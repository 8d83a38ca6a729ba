//! Farm-side descriptor replay.
//!
//! Runs inside the process the farm spawned: load the descriptor, find the
//! target app on the freshly started engine, invoke the recorded method,
//! clean up. There is no result channel back to the farm beyond the
//! process exit status, so errors simply propagate out of [`run`].

use crate::JobError;
use flamebridge_engine::Engine;
use flamebridge_protocol::JobDescriptor;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Load and validate a descriptor, distinguishing the missing-file case (a
/// stale farm argument) from a corrupt one.
pub fn load(descriptor_path: &Path) -> Result<JobDescriptor, JobError> {
    if !descriptor_path.exists() {
        return Err(JobError::MissingDescriptor(descriptor_path.to_path_buf()));
    }
    Ok(JobDescriptor::read_from(descriptor_path)?)
}

/// Replay a loaded descriptor against `engine` and delete the file.
///
/// The descriptor file is removed only after the method ran to completion;
/// a failed deletion is logged and does not affect the job's outcome.
pub fn run(
    descriptor: JobDescriptor,
    descriptor_path: &Path,
    engine: &Engine,
) -> anyhow::Result<()> {
    debug!(
        engine = %descriptor.engine_instance,
        app = %descriptor.app_instance,
        method = %descriptor.method,
        "replaying job descriptor"
    );

    let app = engine
        .app(&descriptor.app_instance)
        .ok_or_else(|| JobError::UnknownApp(descriptor.app_instance.clone()))?;
    app.execute(&descriptor.method, &descriptor.args)?;

    debug!("job descriptor replay complete");
    if let Err(err) = fs::remove_file(descriptor_path) {
        warn!(
            path = %descriptor_path.display(),
            error = %err,
            "could not remove descriptor file"
        );
    }
    Ok(())
}

/// [`load`] + [`run`] in one step, for callers that already have an engine.
pub fn run_file(descriptor_path: &Path, engine: &Engine) -> anyhow::Result<()> {
    let descriptor = load(descriptor_path)?;
    run(descriptor, descriptor_path, engine)
}
