//! File system watcher for development mode.
//!
//! Watches the project root recursively, filters out irrelevant paths
//! (build output, VCS, configured patterns), and forwards raw change events
//! into a bounded channel. Debouncing and affected-target computation happen
//! downstream in the scheduler, not here; the watcher only produces events.

use crate::error::{CliError, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::mpsc;

/// One observed filesystem change. Transient: consumed by the scheduler and
/// absorbed into a debounce window.
#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// The path that changed
    pub path: PathBuf,
    /// When the event was observed
    pub timestamp: Instant,
}

/// Filesystem watcher feeding a bounded event channel.
pub struct FileWatcher {
    /// Underlying notify watcher; kept alive for the watch to stay active
    _watcher: RecommendedWatcher,
    /// Root directory being watched
    root: PathBuf,
}

impl FileWatcher {
    /// Create a watcher over `root` and return it with the event receiver.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or the platform watcher
    /// cannot be created. Runtime watch errors after startup are logged
    /// loudly; the watch never goes quiet without notice.
    pub fn new(root: PathBuf, ignore_patterns: Vec<String>) -> Result<(Self, mpsc::Receiver<WatchEvent>)> {
        if !root.exists() {
            return Err(CliError::InvalidArgument(format!(
                "watch root does not exist: {}",
                root.display()
            )));
        }

        let (tx, rx) = mpsc::channel(256);
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if !matches!(
                        event.kind,
                        notify::EventKind::Create(_)
                            | notify::EventKind::Modify(_)
                            | notify::EventKind::Remove(_)
                    ) {
                        return;
                    }
                    for path in &event.paths {
                        if Self::should_ignore(path, &root_clone, &ignore_patterns) {
                            continue;
                        }
                        // Receiver dropped means shutdown, nothing to report
                        let _ = tx.blocking_send(WatchEvent {
                            path: path.clone(),
                            timestamp: Instant::now(),
                        });
                    }
                }
                Err(e) => {
                    // Watch degradation must be loud, never a silent stop
                    tracing::error!("filesystem watch error: {}", e);
                }
            }
        })
        .map_err(CliError::Watch)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(CliError::Watch)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Check if a path should be ignored.
    fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        // Only paths within the watch root are relevant
        if !path.starts_with(root) {
            return true;
        }

        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => return true,
        };
        let path_str = rel_path.to_string_lossy();

        for pattern in ignore_patterns {
            if let Some(ext) = pattern.strip_prefix('*') {
                // Extension pattern like "*.log"
                if path_str.ends_with(ext) {
                    return true;
                }
            } else if path_str.starts_with(pattern) || path_str.contains(&format!("/{}", pattern)) {
                // Directory pattern like "node_modules"
                return true;
            }
        }

        // Hidden files and directories
        for component in rel_path.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if name.starts_with('.') && name != "." && name != ".." {
                    return true;
                }
            }
        }

        false
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_ignore_output_dir() {
        let root = PathBuf::from("/project");
        let patterns = vec!["dist".to_string(), "target".to_string()];

        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/dist/app/app.wasm"),
            &root,
            &patterns
        ));
        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/target/debug/build"),
            &root,
            &patterns
        ));
        assert!(!FileWatcher::should_ignore(
            &PathBuf::from("/project/client/src/lib.rs"),
            &root,
            &patterns
        ));
    }

    #[test]
    fn test_should_ignore_extension_pattern() {
        let root = PathBuf::from("/project");
        let patterns = vec!["*.log".to_string()];

        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/debug.log"),
            &root,
            &patterns
        ));
        assert!(!FileWatcher::should_ignore(
            &PathBuf::from("/project/www/bootstrap.js"),
            &root,
            &patterns
        ));
    }

    #[test]
    fn test_should_ignore_hidden_and_outside_root() {
        let root = PathBuf::from("/project");
        let patterns = vec![];

        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/project/.git/config"),
            &root,
            &patterns
        ));
        assert!(FileWatcher::should_ignore(
            &PathBuf::from("/elsewhere/file.rs"),
            &root,
            &patterns
        ));
    }
}
