//! Job-field sanitization for the farm submission tool.
//!
//! The submission tool does no sanitization of its own: names containing
//! characters outside a small safe set, or longer than 70 characters, make
//! the submission fail outright. The allow-list and length bound here are
//! contractual with the tool version in use.

use chrono::Local;
use regex::Regex;
use std::sync::OnceLock;

/// Longest job name or description the submission tool accepts.
pub const MAX_JOB_FIELD_LEN: usize = 70;

fn disallowed() -> &'static Regex {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    DISALLOWED.get_or_init(|| Regex::new(r"[^0-9a-zA-Z_\-,\. ]+").expect("static pattern"))
}

/// Strip a job name or description down to the tool's safe character set.
///
/// Each run of disallowed characters collapses to a single `_`; results
/// longer than [`MAX_JOB_FIELD_LEN`] are truncated with a `...` marker.
/// Idempotent on already-sanitized input.
pub fn sanitize_job_field(field: &str) -> String {
    let mut out = disallowed().replace_all(field, "_").into_owned();
    if out.len() > MAX_JOB_FIELD_LEN {
        out.truncate(MAX_JOB_FIELD_LEN - 3);
        out.push_str("...");
    }
    out
}

/// Sanitized job name with the conventional wall-clock suffix, e.g.
/// `Export - shot_010 (10.02.04)`, so operators can tell repeated
/// submissions apart in the farm's job list.
pub fn timestamped_job_name(job_name: &str) -> String {
    format!(
        "{} ({})",
        sanitize_job_field(job_name),
        Local::now().format("%H.%M.%S")
    )
}
