//! Local farm job submission.

use crate::JobError;
use flamebridge_engine::Engine;
use flamebridge_protocol::{
    defaults, naming, paths, ExecutionContext, JobDescriptor, JobId,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

/// One job to queue on the farm: run `method` of `app_instance` with
/// `args`, under the submitting engine's execution context.
pub struct JobRequest {
    /// Human-readable name shown in the farm's job list.
    pub job_name: String,
    pub description: String,
    /// Schedule only after this farm job completes. Used for chains like
    /// "upload the preview once the background export has finished".
    pub run_after: Option<JobId>,
    pub app_instance: String,
    pub method: String,
    pub args: Map<String, Value>,
}

impl JobRequest {
    pub fn new(
        job_name: impl Into<String>,
        description: impl Into<String>,
        app_instance: impl Into<String>,
        method: impl Into<String>,
        args: Map<String, Value>,
    ) -> Self {
        Self {
            job_name: job_name.into(),
            description: description.into(),
            run_after: None,
            app_instance: app_instance.into(),
            method: method.into(),
            args,
        }
    }

    pub fn after(mut self, job_id: JobId) -> Self {
        self.run_after = Some(job_id);
        self
    }
}

/// Hands job requests to the external submission tool.
///
/// Captures everything it needs from the engine at construction time, so a
/// handler can build one and submit from wherever it runs.
pub struct Submitter {
    engine_instance: String,
    context: ExecutionContext,
    shared_tmp: PathBuf,
    manager: Option<String>,
    servers: Option<String>,
    cmdjob_path: Option<PathBuf>,
    replay_executable: Option<PathBuf>,
}

impl Submitter {
    pub fn for_engine(engine: &Engine) -> Self {
        let settings = engine.settings();
        Self {
            engine_instance: settings.instance_name.clone(),
            context: engine.context().clone(),
            shared_tmp: paths::shared_tmp_dir(Some(&settings.backburner_shared_tmp)),
            manager: settings.backburner_manager.clone(),
            servers: settings.backburner_servers.clone(),
            cmdjob_path: settings.cmdjob_path.clone(),
            replay_executable: settings.replay_executable.clone(),
        }
    }

    /// Queue one job on the local farm.
    ///
    /// Blocks until the farm has accepted (not completed) the submission.
    /// A non-zero tool exit is a hard error with no retry; the descriptor
    /// file is left behind in that case: shared-temp garbage at worst,
    /// and the only record of what failed to submit.
    pub fn submit(&self, request: JobRequest) -> Result<(), JobError> {
        let job_name = naming::timestamped_job_name(&request.job_name);
        let description = naming::sanitize_job_field(&request.description);

        let replay_executable = self.resolve_replay_executable()?;
        let install_root = replay_executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));

        let descriptor = JobDescriptor::new(
            self.engine_instance.clone(),
            self.context.clone(),
            request.app_instance,
            request.method,
            request.args,
            install_root,
        );
        let descriptor_path = self.shared_tmp.join(format!(
            "{}{}.json",
            defaults::DESCRIPTOR_FILE_PREFIX,
            Uuid::new_v4().simple()
        ));
        descriptor.write_to(&descriptor_path)?;

        let cmdjob = self.resolve_cmdjob()?;
        let mut command = Command::new(&cmdjob);
        // Run under the submitting user's rights, not the farm service
        // account.
        command.arg("-userRights");
        command.arg(format!("-jobName:{job_name}"));
        command.arg(format!("-description:{description}"));
        if let Some(job_id) = &request.run_after {
            command.arg(format!("-dependencies:{job_id}"));
        }
        if let Some(manager) = &self.manager {
            command.arg(format!("-manager:{manager}"));
        }
        if let Some(servers) = &self.servers {
            command.arg(format!("-servers:{servers}"));
        }
        command.arg(&replay_executable);
        command.arg(&descriptor_path);

        debug!(?command, descriptor = %descriptor_path.display(), "submitting farm job");
        let status = command
            .status()
            .map_err(|source| JobError::Spawn { source })?;
        if !status.success() {
            return Err(JobError::SubmissionFailed {
                job_name,
                status: status.code().unwrap_or(-1),
            });
        }

        info!(job = %job_name, "farm job accepted");
        Ok(())
    }

    fn resolve_cmdjob(&self) -> Result<PathBuf, JobError> {
        if let Some(path) = &self.cmdjob_path {
            return Ok(path.clone());
        }
        for root in paths::install_roots() {
            let candidate = root.join("backburner").join(defaults::CMDJOB_BINARY);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        which::which(defaults::CMDJOB_BINARY)
            .map_err(|_| JobError::ToolNotFound(defaults::CMDJOB_BINARY.to_string()))
    }

    fn resolve_replay_executable(&self) -> Result<PathBuf, JobError> {
        if let Some(path) = &self.replay_executable {
            return Ok(path.clone());
        }
        std::env::current_exe().map_err(|source| JobError::ReplayExecutable { source })
    }
}
