//! Canonical defaults and environment variable names.

/// Selects how the engine process was started: `DCC`, `PRE_LAUNCH` or
/// `BACKBURNER`. An unknown value is a fatal configuration error.
pub const ENV_ENGINE_MODE: &str = "FLAMEBRIDGE_ENGINE_MODE";

/// Directory reachable from every farm host, used for job descriptors.
pub const ENV_SHARED_TMP: &str = "FLAMEBRIDGE_SHARED_TMP";

/// Explicit path to the farm submission tool.
pub const ENV_CMDJOB: &str = "FLAMEBRIDGE_CMDJOB";

/// Farm manager host to submit against (tool default when unset).
pub const ENV_BACKBURNER_MANAGER: &str = "FLAMEBRIDGE_BACKBURNER_MANAGER";

/// Server group restriction for submitted jobs.
pub const ENV_BACKBURNER_SERVERS: &str = "FLAMEBRIDGE_BACKBURNER_SERVERS";

/// Any non-empty value enables debug logging.
pub const ENV_DEBUG_LOGGING: &str = "FLAMEBRIDGE_DEBUG";

/// Host serving this workstation's storage; farm jobs address media
/// through it.
pub const ENV_SERVER_HOSTNAME: &str = "FLAMEBRIDGE_SERVER_HOSTNAME";

/// Executable the farm invokes to replay a descriptor.
pub const ENV_REPLAY_EXECUTABLE: &str = "FLAMEBRIDGE_REPLAY_EXE";

/// Overrides the flamebridge home directory (logs).
pub const ENV_HOME: &str = "FLAMEBRIDGE_HOME";

pub const DEFAULT_INSTANCE_NAME: &str = "flamebridge";
pub const DEFAULT_SERVER_HOSTNAME: &str = "localhost";

/// Farm submission binary name.
pub const CMDJOB_BINARY: &str = "cmdjob";

/// Candidate host install roots, classic layout first.
pub const INSTALL_ROOTS: &[&str] = &["/usr/discreet", "/opt/Autodesk"];

/// Prefix for persisted job descriptor files.
pub const DESCRIPTOR_FILE_PREFIX: &str = "flamebridge_job_";
