//! Dispatch semantics: preset uniqueness, session isolation, batch fan-out
//! order, and the hook adapter layer.

use flamebridge_engine::{
    hooks, BatchCallbacks, Engine, EngineError, EngineMode, EngineScope, EngineSettings,
    ExportCallbacks, FlameVersion,
};
use flamebridge_protocol::payload::keys;
use flamebridge_protocol::{ExecutionContext, SessionId};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

fn test_engine() -> Arc<Engine> {
    Engine::with_mode(
        EngineSettings::from_env(),
        ExecutionContext::new("big_buck_bunny", "jane"),
        EngineMode::Dcc,
    )
}

/// Shared recorder for handler invocations.
#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorder {
    fn record(&self, label: &str, payload: &Value) {
        self.calls
            .lock()
            .unwrap()
            .push((label.to_string(), payload.clone()));
    }

    fn labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[test]
fn duplicate_preset_caption_is_rejected() {
    let engine = test_engine();
    engine
        .register_export_preset("MyExporter", ExportCallbacks::new())
        .unwrap();

    let err = engine
        .register_export_preset("MyExporter", ExportCallbacks::new())
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicatePreset(caption) if caption == "MyExporter"));

    // Distinct captions always succeed.
    engine
        .register_export_preset("OtherExporter", ExportCallbacks::new())
        .unwrap();
    assert_eq!(engine.export_presets(), vec!["MyExporter", "OtherExporter"]);
}

#[test]
fn session_creation_requires_a_registered_preset() {
    let engine = test_engine();
    let err = engine.create_export_session("Unregistered").unwrap_err();
    assert!(matches!(err, EngineError::UnknownPreset { caption, .. } if caption == "Unregistered"));
}

#[test]
fn dispatch_reaches_only_the_bound_preset() {
    let engine = test_engine();
    let recorder = Recorder::default();

    let rec_a = recorder.clone();
    engine
        .register_export_preset(
            "Preset A",
            ExportCallbacks::new().on("preExportAsset", move |_session, info| {
                rec_a.record("A", info);
                Ok(())
            }),
        )
        .unwrap();

    let rec_b = recorder.clone();
    engine
        .register_export_preset(
            "Preset B",
            ExportCallbacks::new().on("preExportAsset", move |_session, info| {
                rec_b.record("B", info);
                Ok(())
            }),
        )
        .unwrap();

    let s1 = engine.create_export_session("Preset A").unwrap();
    let s2 = engine.create_export_session("Preset B").unwrap();
    assert_ne!(s1, s2);

    engine
        .trigger_export_callback("preExportAsset", &s1, &json!({"shotName": "sh010"}))
        .unwrap();
    assert_eq!(recorder.labels(), vec!["A"]);

    engine
        .trigger_export_callback("preExportAsset", &s2, &json!({"shotName": "sh020"}))
        .unwrap();
    assert_eq!(recorder.labels(), vec!["A", "B"]);
}

#[test]
fn overlapping_sessions_on_one_preset_are_independent() {
    let engine = test_engine();
    let recorder = Recorder::default();

    let rec = recorder.clone();
    engine
        .register_export_preset(
            "Stereo Export",
            ExportCallbacks::new().on("postExportAsset", move |session, _info| {
                rec.record(session.as_str(), &Value::Null);
                Ok(())
            }),
        )
        .unwrap();

    // Left/right stereo channels export through two live sessions at once.
    let left = engine.create_export_session("Stereo Export").unwrap();
    let right = engine.create_export_session("Stereo Export").unwrap();

    engine
        .trigger_export_callback("postExportAsset", &right, &json!({}))
        .unwrap();
    engine
        .trigger_export_callback("postExportAsset", &left, &json!({}))
        .unwrap();

    assert_eq!(
        recorder.labels(),
        vec![right.as_str().to_string(), left.as_str().to_string()]
    );
}

#[test]
fn scenario_single_handler_gets_token_and_payload() {
    let engine = test_engine();
    let recorder = Recorder::default();

    let rec = recorder.clone();
    engine
        .register_export_preset(
            "MyExporter",
            ExportCallbacks::new().on("postExportAsset", move |session, info| {
                rec.record(session.as_str(), info);
                Ok(())
            }),
        )
        .unwrap();

    let token = engine.create_export_session("MyExporter").unwrap();
    let payload = json!({"resolvedPath": "/tmp/x.001.exr"});
    engine
        .trigger_export_callback("postExportAsset", &token, &payload)
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, token.as_str());
    assert_eq!(calls[0].1, payload);
}

#[test]
fn unknown_session_dispatch_is_a_no_op() {
    let engine = test_engine();
    let recorder = Recorder::default();

    let rec = recorder.clone();
    engine
        .register_export_preset(
            "MyExporter",
            ExportCallbacks::new().on("postExportAsset", move |_session, info| {
                rec.record("handler", info);
                Ok(())
            }),
        )
        .unwrap();

    // Never produced by create_export_session: must not raise, must not
    // invoke any handler.
    let bogus = SessionId::from_token("bogus-token-123");
    engine
        .trigger_export_callback("postExportAsset", &bogus, &json!({}))
        .unwrap();
    engine
        .trigger_export_callback("anythingAtAll", &bogus, &json!({}))
        .unwrap();

    assert!(recorder.calls().is_empty());
}

#[test]
fn unhandled_callback_name_is_a_no_op() {
    let engine = test_engine();
    engine
        .register_export_preset("MyExporter", ExportCallbacks::new())
        .unwrap();
    let token = engine.create_export_session("MyExporter").unwrap();

    engine
        .trigger_export_callback("preExportSequence", &token, &json!({}))
        .unwrap();
}

#[test]
fn handler_errors_propagate_to_the_caller() {
    let engine = test_engine();
    engine
        .register_export_preset(
            "Failing",
            ExportCallbacks::new()
                .on("preExportAsset", |_s, _i| anyhow::bail!("disk full")),
        )
        .unwrap();
    let token = engine.create_export_session("Failing").unwrap();

    let err = engine
        .trigger_export_callback("preExportAsset", &token, &json!({}))
        .unwrap_err();
    assert_eq!(err.to_string(), "disk full");
}

#[test]
fn batch_fan_out_runs_in_registration_order() {
    let engine = test_engine();
    let recorder = Recorder::default();

    for label in ["L1", "L2", "L3"] {
        let rec = recorder.clone();
        engine.register_batch_callbacks(BatchCallbacks::new().on(
            "batchExportBegin",
            move |info| {
                rec.record(label, info);
                Ok(())
            },
        ));
    }

    // Deterministic order on every dispatch, not just "all invoked".
    for _ in 0..3 {
        engine
            .trigger_batch_callback("batchExportBegin", &json!({}))
            .unwrap();
    }
    assert_eq!(
        recorder.labels(),
        vec!["L1", "L2", "L3", "L1", "L2", "L3", "L1", "L2", "L3"]
    );
}

#[test]
fn batch_listeners_only_see_callbacks_they_registered() {
    let engine = test_engine();
    let recorder = Recorder::default();

    let rec = recorder.clone();
    engine.register_batch_callbacks(BatchCallbacks::new().on("batchExportBegin", move |info| {
        rec.record("begin", info);
        Ok(())
    }));
    let rec = recorder.clone();
    engine.register_batch_callbacks(BatchCallbacks::new().on("batchExportEnd", move |info| {
        rec.record("end", info);
        Ok(())
    }));

    engine
        .trigger_batch_callback("batchExportEnd", &json!({}))
        .unwrap();
    assert_eq!(recorder.labels(), vec!["end"]);
}

#[test]
fn failing_batch_listener_stops_the_fan_out() {
    let engine = test_engine();
    let recorder = Recorder::default();

    let rec = recorder.clone();
    engine.register_batch_callbacks(BatchCallbacks::new().on("batchExportBegin", move |info| {
        rec.record("first", info);
        Ok(())
    }));
    engine.register_batch_callbacks(
        BatchCallbacks::new().on("batchExportBegin", |_info| anyhow::bail!("listener broke")),
    );
    let rec = recorder.clone();
    engine.register_batch_callbacks(BatchCallbacks::new().on("batchExportBegin", move |info| {
        rec.record("third", info);
        Ok(())
    }));

    let err = engine
        .trigger_batch_callback("batchExportBegin", &json!({}))
        .unwrap_err();
    assert_eq!(err.to_string(), "listener broke");
    // The error is already travelling up the host's calling thread; the
    // third listener never ran.
    assert_eq!(recorder.labels(), vec!["first"]);
}

// ---------------------------------------------------------------------------
// Current-engine scope and the hook adapter layer.
//
// These tests share one process-wide cell, so they serialize on a lock.
// ---------------------------------------------------------------------------

static CURRENT_ENGINE_TESTS: Mutex<()> = Mutex::new(());

#[test]
fn engine_scope_saves_and_restores_the_previous_engine() {
    let _serial = CURRENT_ENGINE_TESTS.lock().unwrap();

    assert!(flamebridge_engine::current_engine().is_none());

    let outer = test_engine();
    {
        let _outer_scope = EngineScope::activate(outer.clone());
        assert!(Arc::ptr_eq(
            &flamebridge_engine::current_engine().unwrap(),
            &outer
        ));

        // A temporary engine for an introspection bootstrap.
        let inner = test_engine();
        {
            let _inner_scope = EngineScope::activate(inner.clone());
            assert!(Arc::ptr_eq(
                &flamebridge_engine::current_engine().unwrap(),
                &inner
            ));
        }

        // The prior engine is back even though the inner scope is gone.
        assert!(Arc::ptr_eq(
            &flamebridge_engine::current_engine().unwrap(),
            &outer
        ));
    }
    assert!(flamebridge_engine::current_engine().is_none());
}

#[test]
fn hooks_are_no_ops_without_a_current_engine() {
    let _serial = CURRENT_ENGINE_TESTS.lock().unwrap();

    let mut user_data = Map::new();
    hooks::pre_custom_export(&json!({}), &mut user_data).unwrap();
    assert!(user_data.is_empty());

    hooks::batch_export_begin(&json!({})).unwrap();
    assert!(hooks::get_custom_ui_actions().is_empty());
    assert!(!hooks::use_backburner_post_export_asset());
}

#[test]
fn hook_chain_threads_the_session_through_user_data() {
    let _serial = CURRENT_ENGINE_TESTS.lock().unwrap();

    let engine = test_engine();
    let recorder = Recorder::default();

    let rec = recorder.clone();
    engine
        .register_export_preset(
            "Send to Review",
            ExportCallbacks::new()
                .on("preCustomExport", {
                    let rec = recorder.clone();
                    move |_session, info| {
                        rec.record("pre", info);
                        Ok(())
                    }
                })
                .on("postExportAsset", move |_session, info| {
                    rec.record("post", info);
                    Ok(())
                }),
        )
        .unwrap();

    let _scope = EngineScope::activate(engine.clone());

    // Menu click records the preset; the export hooks that follow carry
    // userData forward.
    let mut user_data = Map::new();
    hooks::custom_ui_action(&json!({"name": "Send to Review"}), &mut user_data).unwrap();
    hooks::pre_custom_export(&json!({"destinationPath": "/tmp"}), &mut user_data).unwrap();

    let token = user_data
        .get(keys::SESSION_ID)
        .and_then(Value::as_str)
        .expect("session token stored in userData")
        .to_string();
    assert!(token.starts_with("fb_"));

    hooks::post_export_asset(&json!({"resolvedPath": "/tmp/x.001.exr"}), &user_data).unwrap();

    let labels = recorder.labels();
    assert_eq!(labels, vec!["pre", "post"]);
}

#[test]
fn menu_actions_come_from_registered_presets() {
    let _serial = CURRENT_ENGINE_TESTS.lock().unwrap();

    let engine = test_engine();
    engine
        .register_export_preset("Send to Review", ExportCallbacks::new())
        .unwrap();
    engine
        .register_export_preset("Publish Plates", ExportCallbacks::new())
        .unwrap();
    engine
        .set_version_info(FlameVersion::from_full("2016.1"))
        .unwrap();

    let _scope = EngineScope::activate(engine.clone());

    let groups = hooks::get_custom_ui_actions();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "flamebridge");
    let captions: Vec<&str> = groups[0]
        .actions
        .iter()
        .map(|action| action.caption.as_str())
        .collect();
    assert_eq!(captions, vec!["Publish Plates", "Send to Review"]);
}

#[test]
fn menu_actions_are_empty_in_the_main_menu_era() {
    let _serial = CURRENT_ENGINE_TESTS.lock().unwrap();

    let engine = test_engine();
    engine
        .register_export_preset("Send to Review", ExportCallbacks::new())
        .unwrap();
    engine
        .set_version_info(FlameVersion::from_full("2018.1"))
        .unwrap();

    let _scope = EngineScope::activate(engine.clone());
    assert!(hooks::get_custom_ui_actions().is_empty());
}
