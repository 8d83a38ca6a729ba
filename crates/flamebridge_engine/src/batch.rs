//! Batch-render callback registration and fan-out dispatch.
//!
//! Unlike export presets, batch events are host-wide notifications: any
//! number of independent apps may care about the same lifecycle event, and
//! batch operations are never concurrent within one host process. So this
//! registry is unkeyed: every listener whose bundle names the callback is
//! invoked, in registration order.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Handler for a single batch callback, invoked with the host's payload.
pub type BatchHandler = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

/// A bundle of batch callbacks registered by one app.
#[derive(Default)]
pub struct BatchCallbacks {
    handlers: HashMap<String, BatchHandler>,
}

impl BatchCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in one callback name.
    pub fn on<F>(mut self, callback_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(callback_name.into(), Arc::new(handler));
        self
    }

    fn handler(&self, callback_name: &str) -> Option<BatchHandler> {
        self.handlers.get(callback_name).cloned()
    }
}

/// Ordered list of registered listeners. Listeners are never removed.
#[derive(Default)]
pub(crate) struct BatchRegistry {
    listeners: Vec<BatchCallbacks>,
}

impl BatchRegistry {
    pub(crate) fn register(&mut self, callbacks: BatchCallbacks) {
        self.listeners.push(callbacks);
    }

    /// Handlers interested in `callback_name`, in registration order.
    pub(crate) fn matching(&self, callback_name: &str) -> Vec<BatchHandler> {
        self.listeners
            .iter()
            .filter_map(|listener| listener.handler(callback_name))
            .collect()
    }
}
