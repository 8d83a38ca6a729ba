//! Descriptor replay: round-trip fidelity and failure modes.

use anyhow::Result;
use flamebridge_backburner::{bootstrap, JobError};
use flamebridge_engine::{Engine, EngineMode, EngineSettings, PipelineApp};
use flamebridge_protocol::{ExecutionContext, JobDescriptor};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// App double that records every invocation.
struct RecordingApp {
    name: String,
    calls: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
}

impl RecordingApp {
    fn new(name: &str) -> (Arc<Self>, Arc<Mutex<Vec<(String, Map<String, Value>)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let app = Arc::new(Self {
            name: name.to_string(),
            calls: calls.clone(),
        });
        (app, calls)
    }
}

impl PipelineApp for RecordingApp {
    fn instance_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, method: &str, args: &Map<String, Value>) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), args.clone()));
        Ok(())
    }
}

/// App double that always fails.
struct BrokenApp;

impl PipelineApp for BrokenApp {
    fn instance_name(&self) -> &str {
        "broken"
    }

    fn execute(&self, _method: &str, _args: &Map<String, Value>) -> Result<()> {
        anyhow::bail!("upload failed: connection reset")
    }
}

fn farm_engine(context: ExecutionContext) -> Arc<Engine> {
    Engine::with_mode(EngineSettings::from_env(), context, EngineMode::Backburner)
}

fn sample_args() -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("path".to_string(), json!("/mnt/proj/shot_010.mov"));
    args.insert("version_number".to_string(), json!(12));
    args.insert("targets".to_string(), json!([{"type": "Shot", "id": 881}]));
    args
}

fn write_descriptor(dir: &Path) -> (JobDescriptor, PathBuf) {
    let descriptor = JobDescriptor::new(
        "flamebridge",
        ExecutionContext::new("big_buck_bunny", "jane"),
        "preview-publisher",
        "upload_preview",
        sample_args(),
        PathBuf::from("/opt/pipeline/flamebridge"),
    );
    let path = dir.join("flamebridge_job_test.json");
    descriptor.write_to(&path).unwrap();
    (descriptor, path)
}

#[test]
fn replay_reconstructs_the_exact_call() {
    let dir = tempfile::tempdir().unwrap();
    let (descriptor, path) = write_descriptor(dir.path());

    let engine = farm_engine(descriptor.context.clone());
    let (app, calls) = RecordingApp::new("preview-publisher");
    engine.register_app(app).unwrap();

    bootstrap::run_file(&path, &engine).unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (method, args) = &calls[0];
    assert_eq!(method, "upload_preview");
    // Round-trip fidelity: the argument mapping survives the persisted
    // form untouched, nested values included.
    assert_eq!(args, &sample_args());

    // Successful replay consumes the descriptor file.
    assert!(!path.exists());
}

#[test]
fn missing_descriptor_is_reported_as_such() {
    let dir = tempfile::tempdir().unwrap();
    let engine = farm_engine(ExecutionContext::new("proj", "user"));

    let err = bootstrap::run_file(&dir.path().join("gone.json"), &engine).unwrap_err();
    let job_err = err.downcast_ref::<JobError>().expect("JobError");
    assert!(matches!(job_err, JobError::MissingDescriptor(_)));
}

#[test]
fn unknown_app_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let (descriptor, path) = write_descriptor(dir.path());

    // Fresh engine without the target app registered.
    let engine = farm_engine(descriptor.context.clone());
    let err = bootstrap::run_file(&path, &engine).unwrap_err();
    let job_err = err.downcast_ref::<JobError>().expect("JobError");
    assert!(matches!(job_err, JobError::UnknownApp(app) if app == "preview-publisher"));
}

#[test]
fn app_failure_propagates_and_keeps_the_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = JobDescriptor::new(
        "flamebridge",
        ExecutionContext::new("big_buck_bunny", "jane"),
        "broken",
        "upload_preview",
        Map::new(),
        PathBuf::from("/opt/pipeline/flamebridge"),
    );
    let path = dir.path().join("flamebridge_job_broken.json");
    descriptor.write_to(&path).unwrap();

    let engine = farm_engine(descriptor.context.clone());
    engine.register_app(Arc::new(BrokenApp)).unwrap();

    let err = bootstrap::run_file(&path, &engine).unwrap_err();
    assert_eq!(err.to_string(), "upload failed: connection reset");

    // The descriptor is only deleted after a successful run.
    assert!(path.exists());
}

#[test]
fn corrupt_descriptor_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flamebridge_job_corrupt.json");
    std::fs::write(&path, b"{\"format_version\": 1, \"engine_instance\"").unwrap();

    let engine = farm_engine(ExecutionContext::new("proj", "user"));
    let err = bootstrap::run_file(&path, &engine).unwrap_err();
    assert!(err.downcast_ref::<JobError>().is_some());
}
