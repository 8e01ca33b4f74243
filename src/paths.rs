//! Path resolution for declaration files and snapshots
//!
//! # Environment Variables
//!
//! - `INFRAGRAPH_FILE` - Declaration file used when `--file` is not given
//! - `INFRAGRAPH_STATE_DIR` - Override the snapshot directory
//!
//! # Path Resolution Priority
//!
//! For state_dir():
//! 1. `INFRAGRAPH_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/infragraph` (if set)
//! 3. `~/.local/state/infragraph`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for the declaration file
pub const ENV_FILE: &str = "INFRAGRAPH_FILE";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "INFRAGRAPH_STATE_DIR";

/// Declaration file looked up in the working directory
pub const DEFAULT_FILE: &str = "infra.toml";

/// Snapshot file name inside the state directory
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Get the infragraph state directory path
pub fn state_dir() -> Result<PathBuf> {
    state_dir_with(|key| std::env::var(key).ok(), dirs::home_dir())
}

fn state_dir_with<F>(env: F, home: Option<PathBuf>) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = env(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Some(xdg_state) = env("XDG_STATE_HOME").filter(|s| !s.is_empty()) {
        let path = PathBuf::from(xdg_state).join("infragraph");
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = home.context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join("infragraph");
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Default snapshot location
pub fn snapshot_file() -> Result<PathBuf> {
    Ok(state_dir()?.join(SNAPSHOT_FILE))
}

/// Resolve a user-supplied path, or fall back to `default`
pub fn resolve_or(path: Option<&Path>, default: impl FnOnce() -> Result<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(expand(&p.to_string_lossy())),
        None => default(),
    }
}

/// Expand ~ and environment variables in a path string.
///
/// # Examples
///
/// ```ignore
/// // Expands ~ to home directory
/// let state = paths::expand("~/.local/state/infragraph");
///
/// // Expands environment variables
/// let file = paths::expand("$HOME/infra/network.toml");
/// ```
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_state_dir_env_override() {
        let env = env_of(&[(ENV_STATE_DIR, "/custom/state"), ("XDG_STATE_HOME", "/xdg")]);
        let dir = state_dir_with(env, Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(dir, PathBuf::from("/custom/state"));
    }

    #[test]
    fn test_state_dir_xdg() {
        let env = env_of(&[("XDG_STATE_HOME", "/xdg")]);
        let dir = state_dir_with(env, Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(dir, PathBuf::from("/xdg/infragraph"));
    }

    #[test]
    fn test_state_dir_default() {
        let dir = state_dir_with(env_of(&[("XDG_STATE_HOME", "")]), Some(PathBuf::from("/home/u"))).unwrap();
        assert_eq!(dir, PathBuf::from("/home/u/.local/state/infragraph"));

        assert!(state_dir_with(env_of(&[]), None).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/infra.toml"), home.join("infra.toml"));
        assert_eq!(expand("/abs/infra.toml"), PathBuf::from("/abs/infra.toml"));
    }

    #[test]
    fn test_resolve_or() {
        let given = resolve_or(Some(Path::new("/tmp/s.json")), || unreachable!()).unwrap();
        assert_eq!(given, PathBuf::from("/tmp/s.json"));

        let fallback = resolve_or(None, || Ok(PathBuf::from("/default"))).unwrap();
        assert_eq!(fallback, PathBuf::from("/default"));
    }
}
