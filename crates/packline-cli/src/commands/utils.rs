//! Shared utilities for command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use packline_config::{ConfigDiscovery, PacklineConfig};

use crate::error::{CliError, Result};

/// Resolve a path relative to a working directory. Absolute paths pass
/// through unchanged.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Resolve the project root from the `--cwd` flag, falling back to the
/// process working directory.
pub fn resolve_root(explicit_cwd: Option<&Path>) -> Result<PathBuf> {
    let current = std::env::current_dir()?;

    match explicit_cwd {
        Some(path) => {
            let absolute = resolve_path(path, &current);
            if !absolute.is_dir() {
                return Err(CliError::InvalidArgument(format!(
                    "--cwd is not a directory: {}",
                    absolute.display()
                )));
            }
            Ok(absolute)
        }
        None => Ok(current),
    }
}

/// Load the configuration from `--config` if given, or discover the
/// conventional file under the project root.
pub fn load_config(root: &Path, config_flag: Option<&Path>) -> Result<PacklineConfig> {
    let discovery = ConfigDiscovery::new(root);
    let config = match config_flag {
        Some(path) => discovery.load_from(&resolve_path(path, root))?,
        None => discovery.load()?,
    };
    Ok(config)
}

/// Clean an output directory by removing its contents, keeping the
/// directory itself. Creates it when missing.
pub fn clean_output_dir(out_dir: &Path) -> Result<()> {
    if out_dir.exists() {
        if !out_dir.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "output path exists but is not a directory: {}",
                out_dir.display()
            )));
        }

        for entry in fs::read_dir(out_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        fs::create_dir_all(out_dir)?;
    }

    Ok(())
}
