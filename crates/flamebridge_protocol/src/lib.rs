//! Shared types for the flamebridge integration.
//!
//! Everything that crosses a boundary lives here: the job descriptor handed
//! to the process farm, the identifiers threaded through host hook calls,
//! the sanitization rules for farm job metadata, and the well-known keys of
//! the host's hook payloads. The engine and the farm-side bootstrap both
//! depend on this crate and on nothing of each other.

pub mod defaults;
pub mod descriptor;
pub mod ids;
pub mod naming;
pub mod paths;
pub mod payload;

pub use descriptor::{DescriptorError, ExecutionContext, JobDescriptor, DESCRIPTOR_FORMAT_VERSION};
pub use ids::{JobId, SessionId};
pub use naming::{sanitize_job_field, timestamped_job_name, MAX_JOB_FIELD_LEN};
