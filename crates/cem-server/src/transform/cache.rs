//! Single-flight transform cache keyed on `(path, mtime, target,
//! transformer version)`. Concurrent requests for the
//! same key coalesce onto one compile; a failed compile is never
//! cached, so the next request retries.

use std::path::PathBuf;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::error::{Result, ServerError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub mtime_nanos: i128,
    pub target: String,
    pub transformer_version: u32,
}

#[derive(Debug, Clone)]
pub struct CompiledSource {
    pub code: String,
    pub mime: &'static str,
}

#[derive(Default)]
pub struct TransformCache {
    entries: DashMap<CacheKey, std::sync::Arc<OnceCell<CompiledSource>>>,
}

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up `key`, computing and storing it via `compute` on first
    /// access. Concurrent callers for the same key await the same
    /// in-flight compile (`OnceCell::get_or_try_init` single-flight
    /// semantics); an `Err` leaves the cell uninitialized so the next
    /// caller retries rather than caching the failure.
    pub async fn get_or_compile<F, Fut>(&self, key: CacheKey, compute: F) -> Result<CompiledSource>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<CompiledSource>>,
    {
        let cell = self
            .entries
            .entry(key)
            .or_insert_with(|| std::sync::Arc::new(OnceCell::new()))
            .clone();
        cell.get_or_try_init(compute).await.cloned()
    }

    /// Drops every entry for `path`, regardless of the mtime/target it
    /// was cached under.
    pub fn invalidate_path(&self, path: &std::path::Path) {
        self.entries.retain(|key, _| key.path != path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for TransformCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformCache").field("entries", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn key(path: &str) -> CacheKey {
        CacheKey {
            path: PathBuf::from(path),
            mtime_nanos: 1,
            target: "es2022".to_string(),
            transformer_version: 1,
        }
    }

    #[tokio::test]
    async fn concurrent_requests_for_same_key_compile_once() {
        let cache = TransformCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = &cache;
            let calls = calls.clone();
            handles.push(async move {
                cache
                    .get_or_compile(key("a.ts"), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok(CompiledSource {
                            code: "export {}".to_string(),
                            mime: "application/javascript",
                        })
                    })
                    .await
            });
        }
        let results = futures::future::join_all(handles).await;
        assert!(results.into_iter().all(|r| r.is_ok()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_compile_is_not_cached() {
        let cache = TransformCache::new();
        let first = cache
            .get_or_compile(key("bad.ts"), || async {
                Err(ServerError::Transform {
                    path: "bad.ts".to_string(),
                    message: "syntax error".to_string(),
                })
            })
            .await;
        assert!(first.is_err());

        let second = cache
            .get_or_compile(key("bad.ts"), || async {
                Ok(CompiledSource {
                    code: "ok".to_string(),
                    mime: "application/javascript",
                })
            })
            .await;
        assert!(second.is_ok());
    }

    #[test]
    fn invalidate_path_drops_all_targets_for_that_path() {
        let cache = TransformCache::new();
        cache.entries.insert(key("a.ts"), std::sync::Arc::new(OnceCell::new()));
        let mut other = key("a.ts");
        other.target = "esnext".to_string();
        cache.entries.insert(other, std::sync::Arc::new(OnceCell::new()));
        cache.entries.insert(key("b.ts"), std::sync::Arc::new(OnceCell::new()));

        cache.invalidate_path(std::path::Path::new("a.ts"));
        assert_eq!(cache.len(), 1);
    }
}
