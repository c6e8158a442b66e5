use std::env;
use std::path::PathBuf;

use dirs_next::{config_dir, home_dir};

/// Expands a leading `~` (Unix or Windows separator) to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home().join(rest);
    }
    PathBuf::from(trimmed)
}

/// Resolves `<config_dir>/bstack/<file_name>`, honoring an override variable.
pub fn config_file_path(override_env: &str, file_name: &str) -> PathBuf {
    if let Ok(path) = env::var(override_env)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("bstack").join(file_name)
}
