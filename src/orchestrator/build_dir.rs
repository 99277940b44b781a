//! Build and install directory lifecycle.

use crate::error::{BuildError, Result};
use std::fs;
use std::path::Path;

/// Remove `path` if present, then create it empty.
///
/// Prior build artifacts are destroyed unconditionally. A symlink at `path`
/// is removed itself, its target is left alone.
pub fn reset_build_directory(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            log::debug!("[BuildDir] Removing existing {}", path.display());
            let removed = if meta.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            removed.map_err(|e| BuildError::io(path, e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(BuildError::io(path, e)),
    }

    fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    log::info!("[BuildDir] Fresh build directory: {}", path.display());
    Ok(())
}

/// Create `path` (and parents) when missing. Returns whether it was created.
pub fn ensure_directory(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| BuildError::io(path, e))?;
    log::debug!("[BuildDir] Created {}", path.display());
    Ok(true)
}
