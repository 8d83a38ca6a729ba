//! Farm job handoff for flamebridge.
//!
//! Two halves of one protocol:
//! - [`submit`] runs in the host-side engine: it persists a job descriptor
//!   to a farm-visible location and hands it to the external submission
//!   tool;
//! - [`bootstrap`] runs in the process the farm later spawns: it replays
//!   the descriptor against a freshly started engine.
//!
//! Submission is synchronous but the submitted job runs asynchronously and
//! out-of-process; the only result channel back from a replayed job is its
//! process exit status.

pub mod bootstrap;
pub mod submit;

use flamebridge_protocol::DescriptorError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from farm submission and descriptor replay.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("cannot locate the farm submission tool '{0}'; install backburner or set FLAMEBRIDGE_CMDJOB")]
    ToolNotFound(String),

    #[error("farm submission tool could not be spawned: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },

    /// Submission failures are surfaced immediately and never retried: a
    /// duplicate submission could duplicate the job's external side
    /// effects.
    #[error("farm rejected job '{job_name}' (exit status {status})")]
    SubmissionFailed { job_name: String, status: i32 },

    #[error("cannot resolve the replay executable: {source}")]
    ReplayExecutable {
        #[source]
        source: std::io::Error,
    },

    #[error("job descriptor file '{}' does not exist", .0.display())]
    MissingDescriptor(PathBuf),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("app '{0}' is not registered with this engine")]
    UnknownApp(String),
}
