//! Engine configuration and wiring errors.

use thiserror::Error;

/// Errors raised by engine registration and lookup operations.
///
/// Everything here indicates broken app/engine wiring that must be fixed,
/// not a transient condition. Callers are expected to fail fast; nothing in
/// this enum is worth retrying.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("an export preset named '{0}' is already registered; preset captions must be unique")]
    DuplicatePreset(String),

    #[error("the export preset '{caption}' is not registered with this engine; registered presets: {registered:?}")]
    UnknownPreset {
        caption: String,
        registered: Vec<String>,
    },

    #[error("an app named '{0}' is already registered with this engine")]
    DuplicateApp(String),

    #[error("no host version has been set on this engine instance")]
    VersionNotSet,

    #[error("host version info was already set on this engine instance")]
    VersionAlreadySet,

    #[error("unknown engine mode '{0}' in FLAMEBRIDGE_ENGINE_MODE")]
    UnknownEngineMode(String),
}
