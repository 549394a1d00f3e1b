//! File system watcher with debouncing for development mode.
//!
//! Watches the source tree and the configuration file, filters out output
//! artifacts and hidden files, and forwards changes through a channel.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::{CliError, Result};

/// File change event type.
#[derive(Debug, Clone)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    /// A change to the configuration file forces a full re-resolve, not
    /// just a rebuild.
    pub fn is_config(&self) -> bool {
        self.path()
            .file_name()
            .is_some_and(|n| n == packline_config::CONFIG_FILE)
    }
}

/// File watcher with debouncing and filtering.
///
/// Rapid successive events for the same file inside the debounce window
/// collapse into one, so editors that write twice do not trigger two
/// rebuilds.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Watch `root` recursively, ignoring anything under `out_dir`.
    pub fn new(
        root: PathBuf,
        out_dir: PathBuf,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(100);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                for path in &event.paths {
                    if Self::should_ignore(path, &root_clone, &out_dir) {
                        continue;
                    }

                    let now = Instant::now();
                    if let Some((last_path, last_time)) = &last_event {
                        if last_path == path && now.duration_since(*last_time) < debounce {
                            continue;
                        }
                    }
                    last_event = Some((path.clone(), now));

                    let change = match event.kind {
                        notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                        notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                        notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                        _ => continue,
                    };

                    let _ = tx.blocking_send(change);
                }
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    fn should_ignore(path: &Path, root: &Path, out_dir: &Path) -> bool {
        if !path.starts_with(root) {
            return true;
        }
        if path.starts_with(out_dir) {
            return true;
        }

        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => return true,
        };

        for component in rel_path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if name.starts_with('.') && name != "." && name != ".." {
                    return true;
                }
                if name == "node_modules" || name == "target" {
                    return true;
                }
            }
        }

        false
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_output_directory() {
        let root = PathBuf::from("/project");
        let out = PathBuf::from("/project/build");

        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/build/js/main.js"),
            &root,
            &out
        ));
        assert!(!FileWatcher::should_ignore(
            &PathBuf::from("/project/src/main.js"),
            &root,
            &out
        ));
    }

    #[test]
    fn ignores_hidden_files_and_vendored_dirs() {
        let root = PathBuf::from("/project");
        let out = PathBuf::from("/project/build");

        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/.git/HEAD"),
            &root,
            &out
        ));
        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/node_modules/pkg/index.js"),
            &root,
            &out
        ));
    }

    #[test]
    fn ignores_paths_outside_root() {
        let root = PathBuf::from("/project");
        let out = PathBuf::from("/project/build");

        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/other/file.js"),
            &root,
            &out
        ));
    }

    #[test]
    fn config_changes_are_flagged() {
        let change = FileChange::Modified(PathBuf::from("/project/packline.toml"));
        assert!(change.is_config());

        let change = FileChange::Modified(PathBuf::from("/project/src/main.js"));
        assert!(!change.is_config());
    }
}
