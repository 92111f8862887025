//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Directory name under the user's config root.
const APP_DIR: &str = "tomatoes";

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Resolves the config file path.
///
/// An explicit `dir` wins. Otherwise the file lives in
/// `$XDG_CONFIG_HOME/tomatoes/`, falling back to `$HOME/.config/tomatoes/`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    let xdg = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let root = config_root(xdg.as_deref(), home.as_deref())?;
    Ok(root.join(APP_DIR).join(CONFIG_FILE))
}

/// Picks the config root. Relative or empty values are ignored, as the XDG
/// base directory rules require.
fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Result<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|p| p.is_absolute()) {
        return Ok(xdg.to_path_buf());
    }
    match home.filter(|p| !p.as_os_str().is_empty()) {
        Some(home) => Ok(home.join(".config")),
        None => bail!("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set"),
    }
}
