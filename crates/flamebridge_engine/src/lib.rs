//! Engine core for the flamebridge DCC integration.
//!
//! The host application exposes no callable API; it invokes registered hook
//! functions at fixed lifecycle points (export begin/end, batch render
//! begin/end, menu actions). Everything here is therefore driven from the
//! host's own thread: pipeline apps register interest up front, the hook
//! adapters in [`hooks`] forward host calls into [`Engine`] dispatch
//! methods, and dispatch runs the registered handlers synchronously
//! in-process.
//!
//! Two registries with deliberately different dispatch semantics:
//! - export callbacks are session-scoped and single-match: a given export
//!   is owned by exactly one registered preset;
//! - batch callbacks are host-wide notifications fanned out to every
//!   registered listener in registration order.

pub mod apps;
pub mod batch;
pub mod config;
mod engine;
mod error;
pub mod export;
pub mod hooks;
pub mod version;

pub use apps::PipelineApp;
pub use batch::{BatchCallbacks, BatchHandler};
pub use config::EngineSettings;
pub use engine::{current_engine, Engine, EngineMode, EngineScope};
pub use error::EngineError;
pub use export::{ExportCallbacks, ExportHandler};
pub use version::{Capabilities, FlameVersion};
