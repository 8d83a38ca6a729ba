//! Well-known names in the host's hook contract.
//!
//! Payload shapes vary across host releases, so the engine treats every
//! payload as an opaque JSON map and only reads the keys it specifically
//! needs. The constants here are the keys (and callback names) the
//! integration actually touches; anything else passes through unexamined.

use crate::ids::JobId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Callback names of the host's export hook contract.
pub mod callbacks {
    pub const PRE_CUSTOM_EXPORT: &str = "preCustomExport";
    pub const POST_CUSTOM_EXPORT: &str = "postCustomExport";
    pub const PRE_EXPORT_SEQUENCE: &str = "preExportSequence";
    pub const POST_EXPORT_SEQUENCE: &str = "postExportSequence";
    pub const PRE_EXPORT_ASSET: &str = "preExportAsset";
    pub const POST_EXPORT_ASSET: &str = "postExportAsset";

    pub const BATCH_EXPORT_BEGIN: &str = "batchExportBegin";
    pub const BATCH_EXPORT_END: &str = "batchExportEnd";
    pub const BATCH_SETUP_LOADED: &str = "batchSetupLoaded";
    pub const BATCH_SETUP_SAVED: &str = "batchSetupSaved";
}

/// Payload keys the integration reads.
pub mod keys {
    pub const DESTINATION_HOST: &str = "destinationHost";
    pub const DESTINATION_PATH: &str = "destinationPath";
    pub const PRESET_PATH: &str = "presetPath";
    pub const RESOLVED_PATH: &str = "resolvedPath";
    pub const NAME: &str = "name";
    pub const SEQUENCE_NAME: &str = "sequenceName";
    pub const SHOT_NAME: &str = "shotName";
    pub const ASSET_TYPE: &str = "assetType";
    pub const SOURCE_IN: &str = "sourceIn";
    pub const SOURCE_OUT: &str = "sourceOut";
    pub const FPS: &str = "fps";
    pub const SETUP_PATH: &str = "setupPath";

    // Present only when the user enabled output versioning.
    pub const VERSION_NAME: &str = "versionName";
    pub const VERSION_NUMBER: &str = "versionNumber";

    // Present on post-asset payloads when the export itself ran on the farm.
    pub const IS_BACKGROUND: &str = "isBackground";
    pub const BACKGROUND_JOB_ID: &str = "backgroundJobId";

    // Keys the adapter layer threads through the host's userData mapping.
    pub const SESSION_ID: &str = "sessionId";
    pub const PRESET_CAPTION: &str = "presetCaption";
}

/// Read a string-valued key from an opaque payload.
pub fn str_key<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}

/// Read an integer-valued key from an opaque payload.
pub fn int_key(payload: &Value, key: &str) -> Option<i64> {
    payload.get(key).and_then(Value::as_i64)
}

/// The farm job id of the background export that produced this payload, if
/// the host ran the export itself on the farm.
pub fn background_job_id(payload: &Value) -> Option<JobId> {
    if !payload
        .get(keys::IS_BACKGROUND)
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return None;
    }
    match str_key(payload, keys::BACKGROUND_JOB_ID) {
        Some(id) if !id.is_empty() => Some(JobId::new(id)),
        _ => None,
    }
}

/// One entry of a contextual menu group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAction {
    pub name: String,
    pub caption: String,
}

/// A named group of actions in the host's contextual menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub name: String,
    pub actions: Vec<MenuAction>,
}
