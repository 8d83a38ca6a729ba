//! Export preset registration and session-scoped dispatch.

use crate::error::EngineError;
use anyhow::Result;
use flamebridge_protocol::SessionId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Handler for a single export callback, invoked with the session token and
/// the host's payload.
pub type ExportHandler = Arc<dyn Fn(&SessionId, &Value) -> Result<()> + Send + Sync>;

/// A named bundle of export callbacks, registered by one app under one
/// menu caption.
///
/// ```
/// use flamebridge_engine::ExportCallbacks;
///
/// let callbacks = ExportCallbacks::new()
///     .on("preExportAsset", |_session, _info| Ok(()))
///     .on("postExportAsset", |_session, _info| Ok(()));
/// ```
#[derive(Default)]
pub struct ExportCallbacks {
    handlers: HashMap<String, ExportHandler>,
}

impl ExportCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in one callback name. Registering the same name
    /// twice within a bundle keeps the latest handler.
    pub fn on<F>(mut self, callback_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&SessionId, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(callback_name.into(), Arc::new(handler));
        self
    }

    fn handler(&self, callback_name: &str) -> Option<ExportHandler> {
        self.handlers.get(callback_name).cloned()
    }
}

/// Registered presets plus the live session table.
///
/// Sessions are never pruned: they are one map entry each, and the host
/// provides no terminal signal that covers aborts and crashes, so there is
/// no point at which an entry could be freed safely. Accepted limitation
/// for very long-lived engine instances.
#[derive(Default)]
pub(crate) struct ExportRegistry {
    presets: HashMap<String, ExportCallbacks>,
    sessions: HashMap<SessionId, String>,
}

impl ExportRegistry {
    pub(crate) fn register(
        &mut self,
        caption: String,
        callbacks: ExportCallbacks,
    ) -> Result<(), EngineError> {
        if self.presets.contains_key(&caption) {
            return Err(EngineError::DuplicatePreset(caption));
        }
        debug!(preset = %caption, "registered export preset");
        self.presets.insert(caption, callbacks);
        Ok(())
    }

    pub(crate) fn preset_captions(&self) -> Vec<String> {
        let mut captions: Vec<String> = self.presets.keys().cloned().collect();
        captions.sort();
        captions
    }

    pub(crate) fn create_session(&mut self, caption: &str) -> Result<SessionId, EngineError> {
        if !self.presets.contains_key(caption) {
            return Err(EngineError::UnknownPreset {
                caption: caption.to_string(),
                registered: self.preset_captions(),
            });
        }
        let session_id = SessionId::generate();
        self.sessions.insert(session_id.clone(), caption.to_string());
        debug!(session = %session_id, preset = %caption, "created export session");
        Ok(session_id)
    }

    /// Resolve the handler bound to `session_id` for `callback_name`.
    ///
    /// `None` covers two expected conditions: a token this engine instance
    /// never issued (leftover host state, or an optional hook the host
    /// calls unconditionally), and a preset with no interest in this
    /// callback. Neither is an error.
    pub(crate) fn resolve(
        &self,
        callback_name: &str,
        session_id: &SessionId,
    ) -> Option<ExportHandler> {
        let caption = match self.sessions.get(session_id) {
            Some(caption) => caption,
            None => {
                debug!(session = %session_id, callback = callback_name,
                       "ignoring dispatch for unknown session");
                return None;
            }
        };
        self.presets
            .get(caption)
            .and_then(|callbacks| callbacks.handler(callback_name))
    }
}
