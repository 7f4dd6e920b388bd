//! Manifest regeneration on file-change events: a
//! single-flight background task drains every change queued while it
//! was running into one follow-up pass, rather than regenerating once
//! per event.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::state::ServerState;
use crate::watcher::Change;

pub fn spawn(state: Arc<ServerState>, mut changes: mpsc::UnboundedReceiver<Change>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(first) = changes.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = changes.try_recv() {
                batch.push(next);
            }
            run_once(&state, &batch).await;
        }
    })
}

async fn run_once(state: &Arc<ServerState>, batch: &[Change]) {
    if batch.iter().any(|change| matches_source_glob(state, &change.path)) {
        let cancel = AtomicBool::new(false);
        match state.coordinator.generate_package(&state.workspace, &state.generate_options, &cancel) {
            Ok(package) => {
                state.publish(package);
                tracing::info!(changed = batch.len(), "regenerated manifest");
            }
            Err(e) => tracing::warn!(error = %e, "manifest regeneration failed"),
        }
    }

    for change in batch {
        state.transform_cache.invalidate_path(&state.root().join(&change.path));
        state.broadcaster.notify_reload(&format!("/{}", change.path));
    }
}

fn matches_source_glob(state: &Arc<ServerState>, path: &str) -> bool {
    state.generate_options.files.iter().any(|pattern| {
        globset::Glob::new(pattern).map(|g| g.compile_matcher().is_match(path)).unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cem_generate::{Coordinator, GenerateOptions};
    use cem_model::Package;
    use cem_workspace::LocalFs;

    fn write(dir: &std::path::Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[tokio::test]
    async fn batches_multiple_changes_into_one_regeneration() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.js", "export class A extends HTMLElement {}");

        let options = crate::options::ServeOptions {
            root: dir.path().to_path_buf(),
            addr: "127.0.0.1:0".parse().unwrap(),
            reload: true,
            target: "es2022".to_string(),
            watch_ignore: vec![],
            typescript_enabled: true,
            css: Default::default(),
            import_map: Default::default(),
            quiet: true,
        };
        let generate_options = GenerateOptions {
            files: vec!["src/**/*.js".to_string()],
            ..Default::default()
        };
        let state = Arc::new(crate::state::ServerState::new(
            options,
            Coordinator::new().unwrap(),
            generate_options,
            Package::new(),
            "custom-elements.json".to_string(),
        ));

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Change { path: "src/a.js".to_string() }).unwrap();
        drop(tx);

        let handle = spawn(state.clone(), rx);
        handle.await.unwrap();

        assert_eq!(state.manifest.load().modules.len(), 1);
    }
}
