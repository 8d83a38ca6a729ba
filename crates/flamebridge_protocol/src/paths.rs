//! Filesystem locations shared with the farm.

use crate::defaults;
use std::env;
use std::path::{Path, PathBuf};

/// Resolve the directory job descriptors are written to.
///
/// Farm workers may run on any host, so this must be a location every
/// job-execution host can reach: a configured shared path, not the local
/// machine's private temp directory. Priority:
/// 1) explicit setting
/// 2) `FLAMEBRIDGE_SHARED_TMP`
/// 3) the system temp directory (single-host setups only)
pub fn shared_tmp_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    if let Ok(path) = env::var(defaults::ENV_SHARED_TMP) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    env::temp_dir()
}

/// Candidate install roots for host binaries, classic layout first.
pub fn install_roots() -> impl Iterator<Item = &'static Path> {
    defaults::INSTALL_ROOTS.iter().map(Path::new)
}
