use std::path::{Path, PathBuf};

use dirs_next::home_dir;

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Resolves a path named inside a file relative to that file's directory.
///
/// Absolute and `~`-prefixed paths are returned expanded but otherwise as is.
pub fn resolve_relative_to(base_file: &Path, path: &str) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        return expanded;
    }
    match base_file.parent() {
        Some(parent) => parent.join(expanded),
        None => expanded,
    }
}
