//! The engine object and the process-wide current-engine cell.

use crate::apps::{AppRegistry, PipelineApp};
use crate::batch::{BatchCallbacks, BatchRegistry};
use crate::config::EngineSettings;
use crate::error::EngineError;
use crate::export::{ExportCallbacks, ExportRegistry};
use crate::version::{Capabilities, FlameVersion};
use flamebridge_protocol::{defaults, ExecutionContext, SessionId};
use serde_json::Value;
use std::env;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

/// How this engine process was started.
///
/// Three distinct bootstrap paths launch the engine: ahead of the host as
/// part of project setup, inside the host itself, or inside a farm worker
/// replaying a queued job. Each sets [`defaults::ENV_ENGINE_MODE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    /// Running before the host launches (project setup).
    PreLaunch,
    /// Running embedded in the host application.
    Dcc,
    /// Running inside a farm worker, replaying a job descriptor.
    Backburner,
}

impl EngineMode {
    /// Read the mode from the environment. Anything but the three known
    /// values (including an unset variable) is a fatal configuration error.
    pub fn from_env() -> Result<Self, EngineError> {
        let raw = env::var(defaults::ENV_ENGINE_MODE).unwrap_or_default();
        raw.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::PreLaunch => "PRE_LAUNCH",
            EngineMode::Dcc => "DCC",
            EngineMode::Backburner => "BACKBURNER",
        }
    }
}

impl FromStr for EngineMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_LAUNCH" => Ok(EngineMode::PreLaunch),
            "DCC" => Ok(EngineMode::Dcc),
            "BACKBURNER" => Ok(EngineMode::Backburner),
            other => Err(EngineError::UnknownEngineMode(other.to_string())),
        }
    }
}

/// The integration engine.
///
/// Owns the export and batch registries, the app registry, and the
/// version/capability cell. All dispatch happens synchronously on the
/// host's calling thread; the mutexes below are interior-mutability
/// plumbing for a shared `Arc<Engine>`, not a concurrency mechanism, and
/// are never held across a handler invocation.
pub struct Engine {
    settings: EngineSettings,
    mode: EngineMode,
    context: ExecutionContext,
    version: OnceLock<(FlameVersion, Capabilities)>,
    exports: Mutex<ExportRegistry>,
    batch: Mutex<BatchRegistry>,
    apps: Mutex<AppRegistry>,
}

impl Engine {
    /// Start a new engine instance, reading the mode from the environment.
    pub fn start(
        settings: EngineSettings,
        context: ExecutionContext,
    ) -> Result<Arc<Self>, EngineError> {
        let mode = EngineMode::from_env()?;
        Ok(Self::with_mode(settings, context, mode))
    }

    /// Start a new engine instance with an explicit mode.
    pub fn with_mode(
        settings: EngineSettings,
        context: ExecutionContext,
        mode: EngineMode,
    ) -> Arc<Self> {
        debug!(
            instance = %settings.instance_name,
            mode = mode.as_str(),
            project = %context.project,
            "initializing engine"
        );
        Arc::new(Self {
            settings,
            mode,
            context,
            version: OnceLock::new(),
            exports: Mutex::new(ExportRegistry::default()),
            batch: Mutex::new(BatchRegistry::default()),
            apps: Mutex::new(AppRegistry::default()),
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn instance_name(&self) -> &str {
        &self.settings.instance_name
    }

    // ---- host version ----

    /// Record which host version this engine runs against. Set once near
    /// process start; a second call is a wiring error.
    pub fn set_version_info(&self, version: FlameVersion) -> Result<(), EngineError> {
        debug!(version = version.full(), "host version set");
        let capabilities = Capabilities::for_version(&version);
        if !capabilities.meets_minimum_supported() {
            warn!(
                version = version.full(),
                "host release is older than the minimum supported version"
            );
        }
        self.version
            .set((version, capabilities))
            .map_err(|_| EngineError::VersionAlreadySet)
    }

    pub fn flame_version(&self) -> Result<&FlameVersion, EngineError> {
        self.version
            .get()
            .map(|(version, _)| version)
            .ok_or(EngineError::VersionNotSet)
    }

    pub fn capabilities(&self) -> Result<&Capabilities, EngineError> {
        self.version
            .get()
            .map(|(_, capabilities)| capabilities)
            .ok_or(EngineError::VersionNotSet)
    }

    // ---- export callbacks ----

    /// Register an export preset under a unique menu caption.
    pub fn register_export_preset(
        &self,
        caption: impl Into<String>,
        callbacks: ExportCallbacks,
    ) -> Result<(), EngineError> {
        self.exports.lock().unwrap().register(caption.into(), callbacks)
    }

    /// Captions of all registered export presets, sorted.
    pub fn export_presets(&self) -> Vec<String> {
        self.exports.lock().unwrap().preset_captions()
    }

    /// Begin an export session bound to a registered preset.
    ///
    /// Session creation is always host-initiated in direct response to a
    /// registered menu click, so an unknown caption is a wiring error, not
    /// a race.
    pub fn create_export_session(&self, caption: &str) -> Result<SessionId, EngineError> {
        self.exports.lock().unwrap().create_session(caption)
    }

    /// Dispatch a host export callback to the preset bound to
    /// `session_id`.
    ///
    /// Unknown sessions are silently ignored: the host may call dispatch
    /// for sessions created by a previous engine instance in the same
    /// process, and calls some optional hooks unconditionally. A handler
    /// error is not caught here; it propagates to the host's hook
    /// invocation boundary.
    pub fn trigger_export_callback(
        &self,
        callback_name: &str,
        session_id: &SessionId,
        payload: &Value,
    ) -> anyhow::Result<()> {
        debug!(callback = callback_name, session = %session_id, "export callback dispatch");
        // Resolve under the lock, invoke outside it: handlers may re-enter
        // the engine (e.g. to submit a farm job).
        let handler = self.exports.lock().unwrap().resolve(callback_name, session_id);
        match handler {
            Some(handler) => handler(session_id, payload),
            None => Ok(()),
        }
    }

    // ---- batch callbacks ----

    /// Register a bundle of batch callbacks. No uniqueness constraint:
    /// every registered bundle naming a callback is invoked on dispatch.
    pub fn register_batch_callbacks(&self, callbacks: BatchCallbacks) {
        self.batch.lock().unwrap().register(callbacks);
    }

    /// Fan a host batch callback out to every interested listener, in
    /// registration order, synchronously. The first handler error aborts
    /// the remainder and propagates to the host.
    pub fn trigger_batch_callback(
        &self,
        callback_name: &str,
        payload: &Value,
    ) -> anyhow::Result<()> {
        debug!(callback = callback_name, "batch callback dispatch");
        let handlers = self.batch.lock().unwrap().matching(callback_name);
        for handler in handlers {
            handler(payload)?;
        }
        Ok(())
    }

    // ---- apps ----

    /// Register a pipeline app by its instance name.
    pub fn register_app(&self, app: Arc<dyn PipelineApp>) -> Result<(), EngineError> {
        self.apps.lock().unwrap().register(app)
    }

    /// Look up a registered app, as a replayed farm job does.
    pub fn app(&self, instance_name: &str) -> Option<Arc<dyn PipelineApp>> {
        self.apps.lock().unwrap().get(instance_name)
    }
}

// ---------------------------------------------------------------------------
// Current engine
// ---------------------------------------------------------------------------

static CURRENT_ENGINE: Mutex<Option<Arc<Engine>>> = Mutex::new(None);

/// The engine currently receiving host hook calls, if any.
pub fn current_engine() -> Option<Arc<Engine>> {
    CURRENT_ENGINE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// RAII activation of an engine as the process-wide current engine.
///
/// The previously current engine (if any) is saved on activation and
/// restored on drop (including on unwind), so a re-entrant bootstrap
/// sequence that stands up a temporary engine for introspection cannot
/// strand the process without its original engine.
pub struct EngineScope {
    previous: Option<Arc<Engine>>,
}

impl EngineScope {
    pub fn activate(engine: Arc<Engine>) -> Self {
        let mut cell = CURRENT_ENGINE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = cell.replace(engine);
        Self { previous }
    }
}

impl Drop for EngineScope {
    fn drop(&mut self) {
        let mut cell = CURRENT_ENGINE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *cell = self.previous.take();
    }
}
