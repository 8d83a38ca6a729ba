//! Relocatable background-job descriptors.
//!
//! A descriptor is the complete description of "run method M of app A with
//! arguments ARGS under context C". It is persisted to a farm-visible file
//! at submission time and replayed later by the re-entry bootstrap, in a
//! different process and possibly on a different host. Nothing in it may
//! reference in-memory state of the submitting process.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Serialization format generation. Bumped when the shape changes so a
/// newer submitter and an older bootstrap (or vice versa) fail loudly
/// instead of misreading fields.
pub const DESCRIPTOR_FORMAT_VERSION: u32 = 1;

/// Errors reading or writing a persisted descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("descriptor at {} is not valid: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("descriptor could not be encoded: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    #[error("descriptor at {} has format version {found}, this build supports version {supported}", .path.display())]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },
}

/// The project/user binding a replayed job runs under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub project: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl ExecutionContext {
    pub fn new(project: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            user: user.into(),
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// A queued method call, persisted for out-of-process replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub format_version: u32,
    /// Engine instance name to stand up on the replay side.
    pub engine_instance: String,
    pub context: ExecutionContext,
    /// App instance that owns the target method.
    pub app_instance: String,
    pub method: String,
    /// Keyword-style arguments handed to the method verbatim.
    pub args: Map<String, Value>,
    /// Root of the pipeline installation on disk. A cold farm process has
    /// no other way to locate the framework it must run.
    pub install_root: PathBuf,
}

impl JobDescriptor {
    pub fn new(
        engine_instance: impl Into<String>,
        context: ExecutionContext,
        app_instance: impl Into<String>,
        method: impl Into<String>,
        args: Map<String, Value>,
        install_root: PathBuf,
    ) -> Self {
        Self {
            format_version: DESCRIPTOR_FORMAT_VERSION,
            engine_instance: engine_instance.into(),
            context,
            app_instance: app_instance.into(),
            method: method.into(),
            args,
            install_root,
        }
    }

    /// Persist to `path` as JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), DescriptorError> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|source| DescriptorError::Encode { source })?;
        fs::write(path, json).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read back a persisted descriptor, rejecting unknown format
    /// generations.
    pub fn read_from(path: &Path) -> Result<Self, DescriptorError> {
        let raw = fs::read(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor: JobDescriptor =
            serde_json::from_slice(&raw).map_err(|source| DescriptorError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if descriptor.format_version != DESCRIPTOR_FORMAT_VERSION {
            return Err(DescriptorError::UnsupportedVersion {
                path: path.to_path_buf(),
                found: descriptor.format_version,
                supported: DESCRIPTOR_FORMAT_VERSION,
            });
        }
        Ok(descriptor)
    }
}
