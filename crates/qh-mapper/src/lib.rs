//! Routes edited files to the most specific configured path and merges
//! per-path command overrides with the root defaults.

use std::collections::BTreeMap;

use qh_config::{CommandConfig, Config, merged_commands, select_most_specific};

/// Path key of the synthetic root component.
pub const ROOT_COMPONENT: &str = ".";

/// Edited files sharing one most-specific `PathConfig`, with the command
/// map that applies to them.
#[derive(Debug, Clone)]
pub struct ComponentGroup {
    /// The matched `PathConfig` pattern, or `.` for the root.
    pub path: String,
    /// Files in input order.
    pub files: Vec<String>,
    /// Root commands overridden by the path's entries.
    pub commands: BTreeMap<String, CommandConfig>,
}

/// Group edited files by their most specific matching `PathConfig`.
///
/// Files matching no pattern land in the root group. An empty file list
/// produces exactly one root group with no files, so the pipeline always
/// has something to run. Paths are treated textually; symlinks are not
/// resolved.
pub fn map_files_to_components(config: &Config, files: &[String]) -> Vec<ComponentGroup> {
    if files.is_empty() {
        return vec![root_group(config)];
    }

    // Option<index into config.paths>, None = root; insertion order kept.
    let mut grouped: Vec<(Option<usize>, Vec<String>)> = Vec::new();
    for file in files {
        let key = select_most_specific(&config.paths, file).map(|(index, _)| index);
        match grouped.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(file.clone()),
            None => grouped.push((key, vec![file.clone()])),
        }
    }

    grouped
        .into_iter()
        .map(|(key, members)| match key {
            Some(index) => {
                let path_cfg = &config.paths[index];
                ComponentGroup {
                    path: path_cfg.path.clone(),
                    files: members,
                    commands: merged_commands(config, path_cfg),
                }
            }
            None => ComponentGroup {
                files: members,
                ..root_group(config)
            },
        })
        .collect()
}

fn root_group(config: &Config) -> ComponentGroup {
    ComponentGroup {
        path: ROOT_COMPONENT.to_string(),
        files: Vec::new(),
        commands: config.commands.clone(),
    }
}
