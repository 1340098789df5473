//! Config file discovery.

use std::path::{Path, PathBuf};

use qh_core::QualhookError;
use tracing::debug;

/// File name searched at every discovery step.
pub const CONFIG_FILE_NAME: &str = ".qualhook.json";
/// Environment variable overriding discovery.
pub const QUALHOOK_CONFIG_ENV: &str = "QUALHOOK_CONFIG";

/// Presence of any of these marks a directory as the project root.
const PROJECT_ROOT_MARKERS: &[&str] = &[".git", "go.mod", "package.json"];

/// Locate the config file using the standard search order:
/// explicit flag, `QUALHOOK_CONFIG`, the working directory, the project
/// root (nearest ancestor with a `.git`/`go.mod`/`package.json`), then
/// the home directory. The first existing file wins.
pub fn discover_config(explicit: Option<&Path>) -> Result<PathBuf, QualhookError> {
    let env_path = std::env::var_os(QUALHOOK_CONFIG_ENV).map(PathBuf::from);
    let cwd = std::env::current_dir()
        .map_err(|e| QualhookError::WorkingDirectory(format!("cannot resolve CWD: {e}")))?;
    let home = directories::UserDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    discover_config_from(explicit, env_path.as_deref(), &cwd, home.as_deref())
}

/// Discovery with every external input injected, for tests.
pub fn discover_config_from(
    explicit: Option<&Path>,
    env_path: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<PathBuf, QualhookError> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    if let Some(path) = env_path {
        candidates.push(path.to_path_buf());
    }
    candidates.push(cwd.join(CONFIG_FILE_NAME));
    if let Some(root) = find_project_root(cwd) {
        candidates.push(root.join(CONFIG_FILE_NAME));
    }
    if let Some(home) = home {
        candidates.push(home.join(CONFIG_FILE_NAME));
    }

    for candidate in candidates {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "discovered config file");
            return Ok(candidate);
        }
    }
    Err(QualhookError::ConfigNotFound)
}

/// Nearest ancestor (including `start`) containing a project-root marker.
fn find_project_root(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        let marked = PROJECT_ROOT_MARKERS
            .iter()
            .any(|marker| dir.join(marker).exists());
        marked.then(|| dir.to_path_buf())
    })
}
