//! Host version parsing, loose ordering, and the derived capability table.
//!
//! Host version strings are free-form: `2016`, `2015.2`, `2017.1.pr70`,
//! `2016.0.0.322`. Callback shapes and available operations change across
//! releases, so every version-gated fact the integration needs is computed
//! here, once, from a small threshold table, never by comparing raw
//! strings at the call site.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// First release whose preset files use schema generation 5.
const PRESET_SCHEMA_V5_MIN: &str = "2016";
/// First release that builds the integration menu into the main menu bar
/// instead of querying the contextual-actions hook.
const MAIN_MENU_MIN: &str = "2018";
/// First release whose project settings accept the extended proxy keys.
const PROXY_SETTINGS_MIN: &str = "2016";
/// First release that ships a per-version python tree.
const PER_VERSION_PYTHON_MIN: &str = "2016";
/// Oldest release the integration supports at all.
const MINIMUM_SUPPORTED: &str = "2015.2";

const LEGACY_PYTHON_INTERPRETER: &str = "/usr/discreet/Python-2.6.9/bin/python";

/// Version of the host application, as reported at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlameVersion {
    major: String,
    minor: String,
    full: String,
}

impl FlameVersion {
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        full: impl Into<String>,
    ) -> Self {
        Self {
            major: major.into(),
            minor: minor.into(),
            full: full.into(),
        }
    }

    /// Derive major/minor tokens from a full version string:
    /// `2016.0.0.322` -> major `2016`, minor `0`.
    pub fn from_full(full: impl Into<String>) -> Self {
        let full = full.into();
        let mut segments = full.split('.');
        let major = segments.next().unwrap_or(&full).to_string();
        let minor = segments.next().unwrap_or("0").to_string();
        Self { major, minor, full }
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn full(&self) -> &str {
        &self.full
    }

    /// Loose ordering against a reference version string.
    ///
    /// Dot-separated segments compare numerically when both sides are
    /// all-digits and lexically otherwise; with an equal prefix, the longer
    /// sequence is the greater version (`2015.2.pr99` > `2015.2`).
    pub fn is_less_than(&self, reference: &str) -> bool {
        loose_cmp(&self.full, reference) == Ordering::Less
    }
}

fn loose_cmp(a: &str, b: &str) -> Ordering {
    let a_segments: Vec<&str> = a.split('.').collect();
    let b_segments: Vec<&str> = b.split('.').collect();

    for index in 0..a_segments.len().max(b_segments.len()) {
        let ordering = match (a_segments.get(index), b_segments.get(index)) {
            (Some(x), Some(y)) => match (x.parse::<u64>(), y.parse::<u64>()) {
                (Ok(xn), Ok(yn)) => xn.cmp(&yn),
                _ => x.cmp(y),
            },
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => break,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Version-gated facts, computed once per engine instance and cached.
#[derive(Debug, Clone)]
pub struct Capabilities {
    preset_schema_version: &'static str,
    main_menu_actions: bool,
    proxy_settings_keys: bool,
    meets_minimum: bool,
    python_interpreter: PathBuf,
}

impl Capabilities {
    pub fn for_version(version: &FlameVersion) -> Self {
        let per_version_python = !version.is_less_than(PER_VERSION_PYTHON_MIN);
        Self {
            // Unknown newer majors degrade to the newest known generation:
            // a schema warning in the host UI beats refusing to export.
            preset_schema_version: if version.is_less_than(PRESET_SCHEMA_V5_MIN) {
                "4"
            } else {
                "5"
            },
            main_menu_actions: !version.is_less_than(MAIN_MENU_MIN),
            proxy_settings_keys: !version.is_less_than(PROXY_SETTINGS_MIN),
            meets_minimum: !version.is_less_than(MINIMUM_SUPPORTED),
            python_interpreter: if per_version_python {
                PathBuf::from(format!(
                    "/usr/discreet/python/{}/bin/python",
                    version.full()
                ))
            } else {
                PathBuf::from(LEGACY_PYTHON_INTERPRETER)
            },
        }
    }

    /// Preset XML schema generation to advertise to the host.
    pub fn preset_schema_version(&self) -> &'static str {
        self.preset_schema_version
    }

    /// Whether the host builds the integration menu into its main menu bar
    /// (in which case the contextual-actions hook must return nothing).
    pub fn uses_main_menu(&self) -> bool {
        self.main_menu_actions
    }

    /// Whether this release meets the oldest supported version.
    pub fn meets_minimum_supported(&self) -> bool {
        self.meets_minimum
    }

    /// Python interpreter shipped with this host release.
    pub fn python_interpreter(&self) -> &Path {
        &self.python_interpreter
    }

    /// Project-creation settings keys that are safe to send to this host.
    /// Older releases reject the extended proxy keys outright.
    pub fn project_settings_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![
            "FrameWidth",
            "FrameHeight",
            "FrameDepth",
            "AspectRatio",
            "FrameRate",
            "FieldDominance",
            "ProxyEnable",
            "ProxyWidthHint",
            "ProxyDepthMode",
        ];
        if self.proxy_settings_keys {
            keys.extend(["ProxyMinFrameSize", "ProxyAbove8bits", "ProxyQuality"]);
        }
        keys
    }
}
