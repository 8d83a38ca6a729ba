//! Host-facing hook entry points.
//!
//! The host calls fixed-name functions at fixed lifecycle points; these
//! thin adapters resolve the process-wide current engine and forward into
//! its dispatch methods. When no engine is current (the user opted out of
//! the integration for this project), every hook degrades to a no-op.
//!
//! The host threads a mutable `userData` mapping through the hooks of one
//! export; the adapters use it to carry the session token from the hook
//! that creates the session to the hooks that dispatch against it.

use crate::engine::current_engine;
use anyhow::Result;
use flamebridge_protocol::payload::{self, callbacks, keys, MenuAction, MenuGroup};
use flamebridge_protocol::SessionId;
use serde_json::{json, Map, Value};

/// Menu action click. Records the chosen preset caption in `user_data` so
/// the custom-export hooks that follow can bind a session to it.
pub fn custom_ui_action(info: &Value, user_data: &mut Map<String, Value>) -> Result<()> {
    if let Some(name) = payload::str_key(info, keys::NAME) {
        user_data.insert(
            keys::PRESET_CAPTION.to_string(),
            Value::String(name.to_string()),
        );
    }
    Ok(())
}

/// Called when a user-initiated custom export begins. Binds a fresh session
/// to the preset recorded by [`custom_ui_action`], stores its token in
/// `user_data`, and dispatches.
pub fn pre_custom_export(info: &Value, user_data: &mut Map<String, Value>) -> Result<()> {
    let Some(engine) = current_engine() else {
        return Ok(());
    };
    let Some(caption) = user_data
        .get(keys::PRESET_CAPTION)
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        // Not one of ours: a custom export initiated outside the
        // integration menu.
        return Ok(());
    };

    let session_id = engine.create_export_session(&caption)?;
    user_data.insert(
        keys::SESSION_ID.to_string(),
        Value::String(session_id.as_str().to_string()),
    );
    engine.trigger_export_callback(callbacks::PRE_CUSTOM_EXPORT, &session_id, info)
}

pub fn post_custom_export(info: &Value, user_data: &Map<String, Value>) -> Result<()> {
    dispatch_with_session(callbacks::POST_CUSTOM_EXPORT, info, user_data)
}

pub fn pre_export_sequence(info: &Value, user_data: &Map<String, Value>) -> Result<()> {
    dispatch_with_session(callbacks::PRE_EXPORT_SEQUENCE, info, user_data)
}

pub fn post_export_sequence(info: &Value, user_data: &Map<String, Value>) -> Result<()> {
    dispatch_with_session(callbacks::POST_EXPORT_SEQUENCE, info, user_data)
}

pub fn pre_export_asset(info: &Value, user_data: &Map<String, Value>) -> Result<()> {
    dispatch_with_session(callbacks::PRE_EXPORT_ASSET, info, user_data)
}

pub fn post_export_asset(info: &Value, user_data: &Map<String, Value>) -> Result<()> {
    dispatch_with_session(callbacks::POST_EXPORT_ASSET, info, user_data)
}

/// Whether the host should run the post-asset callback from a farm job
/// rather than synchronously on its export thread.
pub fn use_backburner_post_export_asset() -> bool {
    current_engine()
        .map(|engine| engine.settings().use_backburner_post_export_asset)
        .unwrap_or(false)
}

/// Menu groups for the host's contextual menu, sourced from the registered
/// export presets.
///
/// Empty when no engine is current, when nothing is registered, and from
/// the main-menu era onward (newer hosts build the integration menu into
/// the main menu bar through a different channel).
pub fn get_custom_ui_actions() -> Vec<MenuGroup> {
    let Some(engine) = current_engine() else {
        return Vec::new();
    };
    if engine
        .capabilities()
        .map(|capabilities| capabilities.uses_main_menu())
        .unwrap_or(false)
    {
        return Vec::new();
    }

    let actions: Vec<MenuAction> = engine
        .export_presets()
        .into_iter()
        .map(|caption| MenuAction {
            name: caption.clone(),
            caption,
        })
        .collect();
    if actions.is_empty() {
        return Vec::new();
    }

    vec![MenuGroup {
        name: engine.instance_name().to_string(),
        actions,
    }]
}

pub fn batch_export_begin(info: &Value) -> Result<()> {
    dispatch_batch(callbacks::BATCH_EXPORT_BEGIN, info)
}

pub fn batch_export_end(info: &Value) -> Result<()> {
    dispatch_batch(callbacks::BATCH_EXPORT_END, info)
}

/// The host reports setup load/save with a bare path; wrap it in the
/// payload shape listeners expect.
pub fn batch_setup_loaded(setup_path: &str) -> Result<()> {
    dispatch_batch(
        callbacks::BATCH_SETUP_LOADED,
        &json!({ keys::SETUP_PATH: setup_path }),
    )
}

pub fn batch_setup_saved(setup_path: &str) -> Result<()> {
    dispatch_batch(
        callbacks::BATCH_SETUP_SAVED,
        &json!({ keys::SETUP_PATH: setup_path }),
    )
}

fn dispatch_with_session(
    callback_name: &str,
    info: &Value,
    user_data: &Map<String, Value>,
) -> Result<()> {
    let Some(engine) = current_engine() else {
        return Ok(());
    };
    let Some(token) = user_data.get(keys::SESSION_ID).and_then(Value::as_str) else {
        // An export this integration did not initiate.
        return Ok(());
    };
    engine.trigger_export_callback(callback_name, &SessionId::from_token(token), info)
}

fn dispatch_batch(callback_name: &str, info: &Value) -> Result<()> {
    match current_engine() {
        Some(engine) => engine.trigger_batch_callback(callback_name, info),
        None => Ok(()),
    }
}
