//! Per-resource-UID memory of the highest successfully processed
//! `metadata.generation`.

use dashmap::DashMap;

/// A deduplication aid, not an authority: it is in-memory and per-process.
/// On restart a cold cache causes at most one redundant reconciliation per
/// resource, which must be idempotent anyway.
///
/// Reads and writes are atomic per key (backed by `dashmap`'s striped
/// locking, the same concurrent map `kube_runtime::reflector::store` uses
/// for its object cache), so no additional synchronization is needed across
/// concurrent [`crate::dispatcher::EventDispatcher::handle_event`] calls for
/// different UIDs.
#[derive(Debug, Default)]
pub struct GenerationCache {
    seen: DashMap<String, i64>,
}

impl GenerationCache {
    pub fn new() -> Self {
        Self { seen: DashMap::new() }
    }

    /// `true` iff no entry exists for `uid`, or `generation` is strictly
    /// greater than the stored value.
    ///
    /// Callers gate this on `generationAware` themselves: the cache has no
    /// notion of that flag and always compares generations when asked.
    pub fn should_process(&self, uid: &str, generation: i64) -> bool {
        match self.seen.get(uid) {
            Some(stored) => generation > *stored,
            None => true,
        }
    }

    /// Record a successful reconciliation. Invariant: called only after a
    /// callback returns normally — a failed reconciliation must leave the
    /// cache unchanged so a retry reprocesses the same generation.
    pub fn mark_processed(&self, uid: &str, generation: i64) {
        self.seen
            .entry(uid.to_string())
            .and_modify(|g| {
                if generation > *g {
                    *g = generation;
                }
            })
            .or_insert(generation);
    }

    /// The currently stored generation for `uid`, if any. Exposed for tests
    /// and for introspection by an embedding application.
    pub fn last_processed(&self, uid: &str) -> Option<i64> {
        self.seen.get(uid).map(|g| *g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_entry_should_process() {
        let cache = GenerationCache::new();
        assert!(cache.should_process("a", 1));
    }

    #[test]
    fn strictly_greater_generation_should_process() {
        let cache = GenerationCache::new();
        cache.mark_processed("a", 5);
        assert!(!cache.should_process("a", 5));
        assert!(!cache.should_process("a", 4));
        assert!(cache.should_process("a", 6));
    }

    #[test]
    fn mark_processed_never_regresses() {
        let cache = GenerationCache::new();
        cache.mark_processed("a", 5);
        cache.mark_processed("a", 3);
        assert_eq!(cache.last_processed("a"), Some(5));
    }

    #[test]
    fn entries_are_independent_per_uid() {
        let cache = GenerationCache::new();
        cache.mark_processed("a", 10);
        assert!(cache.should_process("b", 1));
    }
}
