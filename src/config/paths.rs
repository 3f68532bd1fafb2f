use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "SSHM_CONFIG_DIR";

const APP_DIR_NAME: &str = "ssh-tui-manager";

/// Pick the configuration directory without touching the filesystem.
///
/// Priority: explicit flag > `SSHM_CONFIG_DIR` > `$XDG_CONFIG_HOME` >
/// platform config dir > `$HOME/.config`.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    if let Some(dir) = non_empty_env(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    if let Some(xdg) = non_empty_env("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join(APP_DIR_NAME));
    }

    if let Some(base) = dirs::config_dir() {
        return Ok(base.join(APP_DIR_NAME));
    }

    let home = non_empty_env("HOME")
        .ok_or_else(|| AppError::ConfigError("HOME environment variable not set".to_string()))?;
    Ok(Path::new(&home).join(".config").join(APP_DIR_NAME))
}

/// Create the configuration directory if it doesn't exist.
pub fn ensure_config_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to create config directory {}: {}",
                dir.display(),
                e
            ))
        })?;
    }
    if !dir.is_dir() {
        return Err(AppError::ConfigError(format!(
            "Config path {} is not a directory",
            dir.display()
        )));
    }
    Ok(())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
