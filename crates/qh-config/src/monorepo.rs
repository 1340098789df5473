//! Monorepo resolution: pick the `PathConfig` covering a working
//! directory and merge its command overrides over the root.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{CommandConfig, Config, PathConfig};
use crate::pattern;

/// Clone the root command map and overwrite it with a path's overrides.
///
/// An explicit `null` override removes the root entry; absent keys
/// inherit. The root config is never mutated.
pub fn merged_commands(
    root: &Config,
    path_cfg: &PathConfig,
) -> BTreeMap<String, CommandConfig> {
    let mut merged = root.commands.clone();
    for (name, override_cmd) in &path_cfg.commands {
        match override_cmd {
            Some(cmd) => {
                merged.insert(name.clone(), cmd.clone());
            }
            None => {
                merged.remove(name);
            }
        }
    }
    merged
}

/// Resolve the effective config for a working directory inside a
/// monorepo.
///
/// Computes `working_dir` relative to the config file's directory, finds
/// the most specific matching `PathConfig`, and returns a fresh config
/// whose command map is the merge of root and override. With no
/// `PathConfig`s, no relative prefix, or no match, the root is returned
/// unchanged (cloned).
pub fn load_for_monorepo(config: &Config, config_dir: &Path, working_dir: &Path) -> Config {
    if config.paths.is_empty() {
        return config.clone();
    }

    let Ok(relative) = working_dir.strip_prefix(config_dir) else {
        return config.clone();
    };
    let rel_path = normalize_slashes(relative);
    if rel_path.is_empty() {
        return config.clone();
    }

    let Some((_, selected)) = pattern::select_most_specific(&config.paths, &rel_path) else {
        return config.clone();
    };

    Config {
        commands: merged_commands(config, selected),
        ..config.clone()
    }
}

fn normalize_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
