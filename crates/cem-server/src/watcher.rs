//! Recursive filesystem watcher, built as a debounced
//! event stream over `notify`, debounced per changed path on a 100 ms
//! sliding window rather than globally, since the dev server must not
//! let a burst of writes to one file delay reload notifications for an
//! unrelated one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use notify::event::EventKind;
use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;

use crate::error::Result;

const DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Change {
    /// Project-root-relative, forward-slash.
    pub path: String,
}

/// Holds the live `notify` watcher so it isn't dropped (and stopped)
/// while the server is running.
pub struct SourceWatcher {
    _inner: RecommendedWatcher,
}

pub fn watch(root: &Path, ignore: globset::GlobSet) -> Result<(SourceWatcher, mpsc::UnboundedReceiver<Change>)> {
    let (settled_tx, settled_rx) = mpsc::unbounded_channel();
    let generations: Arc<DashMap<PathBuf, u64>> = Arc::new(DashMap::new());
    let root_owned = root.to_path_buf();

    let handle = tokio::runtime::Handle::current();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<NotifyEvent>| {
        let Ok(event) = res else { return };
        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)) {
            return;
        }
        for abs_path in event.paths {
            let Ok(rel) = abs_path.strip_prefix(&root_owned) else { continue };
            let rel_str = cem_workspace_relative(rel);
            if ignore.is_match(&rel_str) {
                continue;
            }
            schedule_settle(&generations, &handle, abs_path.clone(), rel_str, settled_tx.clone());
        }
    })?;
    watcher.watch(root, RecursiveMode::Recursive)?;

    Ok((SourceWatcher { _inner: watcher }, settled_rx))
}

fn schedule_settle(
    generations: &Arc<DashMap<PathBuf, u64>>,
    handle: &tokio::runtime::Handle,
    abs_path: PathBuf,
    rel_str: String,
    settled_tx: mpsc::UnboundedSender<Change>,
) {
    let generation = {
        let mut entry = generations.entry(abs_path.clone()).or_insert(0);
        *entry += 1;
        *entry
    };
    let generations = generations.clone();
    handle.spawn(async move {
        tokio::time::sleep(DEBOUNCE).await;
        let is_latest = generations.get(&abs_path).map(|g| *g == generation).unwrap_or(false);
        if is_latest {
            generations.remove(&abs_path);
            let _ = settled_tx.send(Change { path: rel_str });
        }
    });
}

fn cem_workspace_relative(path: &Path) -> String {
    path.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect::<Vec<_>>().join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detects_a_write_after_debounce_window() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "1").unwrap();

        let ignore = globset::GlobSetBuilder::new().build().unwrap();
        let (_watcher, mut rx) = watch(dir.path(), ignore).unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        std::fs::write(dir.path().join("a.js"), "2").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(change.path, "a.js");
    }

    #[tokio::test]
    async fn ignored_paths_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules")).unwrap();

        let mut builder = globset::GlobSetBuilder::new();
        builder.add(globset::Glob::new("node_modules/**").unwrap());
        let ignore = builder.build().unwrap();
        let (_watcher, mut rx) = watch(dir.path(), ignore).unwrap();

        std::fs::write(dir.path().join("node_modules/x.js"), "1").unwrap();
        std::fs::write(dir.path().join("kept.js"), "1").unwrap();

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(change.path, "kept.js");
    }
}
