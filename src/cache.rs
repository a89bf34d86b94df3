use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::connections::Connection;
use crate::layout::Relaxation;

/// Memoized layout results, owned by whoever drives the layout (normally [`crate::Atlas`]).
///
/// Each table computes a missing entry while holding its lock, so concurrent callers asking
/// for the same key wait for the first computation instead of repeating it.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: Memo<Relaxation>,
    connections: Memo<Vec<Connection>>,
}

/// Hit/miss counters since creation or the last [`LayoutCache::clear`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self, key: &str, compute: impl FnOnce() -> Relaxation) -> Arc<Relaxation> {
        self.layouts.get_or_compute(key, compute)
    }

    pub fn connections(
        &self,
        key: &str,
        compute: impl FnOnce() -> Vec<Connection>,
    ) -> Arc<Vec<Connection>> {
        self.connections.get_or_compute(key, compute)
    }

    pub fn clear(&self) {
        self.layouts.clear();
        self.connections.clear();
    }

    pub fn len(&self) -> usize {
        self.layouts.len() + self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let layouts = self.layouts.stats();
        let connections = self.connections.stats();
        CacheStats {
            entries: layouts.entries + connections.entries,
            hits: layouts.hits + connections.hits,
            misses: layouts.misses + connections.misses,
        }
    }
}

/// `scope::sorted-companies__sorted-synergies__tag`.
///
/// Sorting makes the key independent of input order; `scope` keeps clusters and layout modes
/// that happen to share members apart.
pub fn cache_key(scope: &str, companies: &[&str], synergies: &[&str], tag: &str) -> String {
    let mut companies = companies.to_vec();
    companies.sort_unstable();
    let mut synergies = synergies.to_vec();
    synergies.sort_unstable();
    format!(
        "{scope}::{}__{}__{tag}",
        companies.join(","),
        synergies.join(",")
    )
}

#[derive(Debug)]
struct Memo<T> {
    entries: Mutex<HashMap<String, Arc<T>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }
}

impl<T> Memo<T> {
    fn get_or_compute(&self, key: &str, compute: impl FnOnce() -> T) -> Arc<T> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "layout cache hit");
            return Arc::clone(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key, "layout cache miss");
        let value = Arc::new(compute());
        entries.insert(key.to_owned(), Arc::clone(&value));
        value
    }

    fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use eframe::egui::vec2;

    use super::*;

    fn relaxation(x: f32) -> Relaxation {
        Relaxation {
            positions: vec![vec2(x, 0.0)],
            iterations: 1,
            converged: true,
        }
    }

    #[test]
    fn keys_ignore_input_order() {
        let first = cache_key("c1", &["b", "a"], &["s2", "s1"], "ordered");
        let second = cache_key("c1", &["a", "b"], &["s1", "s2"], "ordered");
        assert_eq!(first, second);
        assert_eq!(first, "c1::a,b__s1,s2__ordered");
        assert_ne!(first, cache_key("c1", &["a", "b"], &["s1", "s2"], "natural"));
        assert_ne!(first, cache_key("c2", &["a", "b"], &["s1", "s2"], "ordered"));
    }

    #[test]
    fn computes_once_per_key() {
        let cache = LayoutCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let layout = cache.layout("k", || {
                calls.fetch_add(1, Ordering::Relaxed);
                relaxation(1.0)
            });
            assert_eq!(layout.positions[0].x, 1.0);
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                entries: 1,
                hits: 2,
                misses: 1
            }
        );
    }

    #[test]
    fn clear_forces_recomputation() {
        let cache = LayoutCache::new();
        cache.layout("k", || relaxation(1.0));
        cache.connections("k", Vec::new);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        let layout = cache.layout("k", || relaxation(2.0));
        assert_eq!(layout.positions[0].x, 2.0);
    }

    #[test]
    fn concurrent_callers_share_one_computation() {
        let cache = LayoutCache::new();
        let calls = AtomicUsize::new(0);
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache.layout("shared", || {
                        calls.fetch_add(1, Ordering::Relaxed);
                        relaxation(3.0)
                    })
                });
            }
        });
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
