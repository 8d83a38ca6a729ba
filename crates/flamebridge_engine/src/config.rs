//! Static configuration for one engine instance.

use flamebridge_protocol::{defaults, paths};
use std::env;
use std::path::PathBuf;

/// Settings an engine instance is constructed with.
///
/// Read once at startup; never mutated while the engine is live.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Name recorded in job descriptors and used to label menu groups.
    pub instance_name: String,

    pub debug_logging: bool,

    /// Directory reachable by every farm host; job descriptors are written
    /// here. Must be a shared path in multi-host farms.
    pub backburner_shared_tmp: PathBuf,

    /// Farm manager host to submit against; tool default when `None`.
    pub backburner_manager: Option<String>,

    /// Server group restriction for submitted jobs.
    pub backburner_servers: Option<String>,

    /// Explicit path to the farm submission tool; resolved from the host
    /// install roots and `PATH` when unset.
    pub cmdjob_path: Option<PathBuf>,

    /// Executable the farm invokes to replay a descriptor; defaults to the
    /// current executable.
    pub replay_executable: Option<PathBuf>,

    /// Host serving this workstation's storage; farm jobs address media
    /// through it.
    pub server_hostname: String,

    /// Defer post-asset export work to the farm instead of running it on
    /// the host's export thread.
    pub use_backburner_post_export_asset: bool,
}

impl EngineSettings {
    /// Build settings from the documented environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            instance_name: defaults::DEFAULT_INSTANCE_NAME.to_string(),
            debug_logging: non_empty(defaults::ENV_DEBUG_LOGGING).is_some(),
            backburner_shared_tmp: paths::shared_tmp_dir(None),
            backburner_manager: non_empty(defaults::ENV_BACKBURNER_MANAGER),
            backburner_servers: non_empty(defaults::ENV_BACKBURNER_SERVERS),
            cmdjob_path: non_empty(defaults::ENV_CMDJOB).map(PathBuf::from),
            replay_executable: non_empty(defaults::ENV_REPLAY_EXECUTABLE).map(PathBuf::from),
            server_hostname: non_empty(defaults::ENV_SERVER_HOSTNAME)
                .unwrap_or_else(|| defaults::DEFAULT_SERVER_HOSTNAME.to_string()),
            use_backburner_post_export_asset: true,
        }
    }
}

fn non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
