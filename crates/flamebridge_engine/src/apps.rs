//! Pipeline app registry.

use crate::error::EngineError;
use anyhow::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A pipeline app the engine can dispatch into.
///
/// Apps register export/batch interest against the engine at init time.
/// They can additionally be invoked by name from a replayed farm job, so
/// the method surface is dynamic: `execute` receives the method name
/// recorded in the job descriptor together with its keyword-style
/// arguments, and is expected to reject names it does not implement.
pub trait PipelineApp: Send + Sync {
    /// Stable instance name, recorded in job descriptors.
    fn instance_name(&self) -> &str;

    /// Invoke a named method with keyword-style arguments.
    fn execute(&self, method: &str, args: &Map<String, Value>) -> Result<()>;
}

#[derive(Default)]
pub(crate) struct AppRegistry {
    apps: HashMap<String, Arc<dyn PipelineApp>>,
}

impl AppRegistry {
    pub(crate) fn register(&mut self, app: Arc<dyn PipelineApp>) -> Result<(), EngineError> {
        let name = app.instance_name().to_string();
        if self.apps.contains_key(&name) {
            return Err(EngineError::DuplicateApp(name));
        }
        debug!(app = %name, "registered app");
        self.apps.insert(name, app);
        Ok(())
    }

    pub(crate) fn get(&self, instance_name: &str) -> Option<Arc<dyn PipelineApp>> {
        self.apps.get(instance_name).cloned()
    }
}
