//! Optional keyed worker pool for per-resource-uid serialization.
//!
//! Not used by [`crate::dispatcher::EventDispatcher`] itself: per-uid
//! ordering is the event source's responsibility, not the dispatcher's.
//! This is plumbing an event-source author can reach for: one FIFO queue
//! per uid, drained by a bounded pool of workers, rather than a global lock.

use dashmap::{mapref::entry::Entry, DashMap};
use std::{future::Future, sync::Arc};
use tokio::{sync::mpsc, sync::Semaphore, task::JoinHandle};

/// Runs at most one task per key at a time, across a bounded set of worker
/// slots, draining each key's queue in FIFO order. Items for different keys
/// may run concurrently, up to `concurrency`; items for the same key never
/// run out of order and never run concurrently with each other.
///
/// A key's queue and drain task are retired once the queue runs dry, so an
/// idle key costs nothing once its backlog is processed; a fresh `submit`
/// for that key afterwards spawns a new drain task rather than reusing a
/// stale one.
pub struct KeyedWorkerPool<T> {
    queues: Arc<DashMap<String, mpsc::UnboundedSender<T>>>,
    concurrency: Arc<Semaphore>,
}

impl<T> KeyedWorkerPool<T>
where
    T: Send + 'static,
{
    /// `concurrency` bounds how many keys may be actively draining at once;
    /// it does not bound the number of distinct keys or their queue depth.
    pub fn new(concurrency: usize) -> Self {
        Self {
            queues: Arc::new(DashMap::new()),
            concurrency: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    /// The number of keys with a live queue/drain task right now. Exposed
    /// for tests, to confirm idle keys are actually retired rather than
    /// leaking.
    pub fn active_key_count(&self) -> usize {
        self.queues.len()
    }

    /// Enqueue `item` for `key`, spawning a drain task for that key if one
    /// isn't already running. `handler` is invoked once per item, strictly
    /// in submission order within a key.
    ///
    /// Returns the drain task's `JoinHandle` the first time a key's queue is
    /// created, or `None` if the key already has a running drain task (the
    /// item was simply enqueued onto it).
    ///
    /// Lookup and insert happen under a single `DashMap` shard lock (via
    /// `entry`), so two concurrent `submit` calls for a brand-new key can
    /// never each spawn their own drain task for it — one creates the queue,
    /// the other finds it and enqueues onto it.
    pub fn submit<F, Fut>(&self, key: String, item: T, handler: F) -> Option<JoinHandle<()>>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        match self.queues.entry(key.clone()) {
            Entry::Occupied(entry) => {
                let _ = entry.get().send(item);
                None
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let _ = tx.send(item);
                entry.insert(tx.clone());
                Some(self.spawn_drain(key, tx, rx, handler))
            }
        }
    }

    fn spawn_drain<F, Fut>(
        &self,
        key: String,
        tx: mpsc::UnboundedSender<T>,
        mut rx: mpsc::UnboundedReceiver<T>,
        handler: F,
    ) -> JoinHandle<()>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let queues = Arc::clone(&self.queues);
        let concurrency = Arc::clone(&self.concurrency);
        let handler = Arc::new(handler);
        tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                if let Ok(permit) = concurrency.acquire().await {
                    (handler)(item).await;
                    drop(permit);
                }

                // The channel never closes on its own: `queues` always holds
                // a live sender for this key, so `rx.recv()` would block
                // forever rather than returning `None`. Retire the queue
                // ourselves once it's empty, instead.
                if rx.is_empty() {
                    // `remove_if` takes the shard lock for this key, the same
                    // lock `submit`'s `entry` call takes. If a submit raced
                    // us and sent an item before we acquire it, our removal
                    // still only drops the *map's* reference to `tx` — the
                    // item is already sitting in `rx`, which we still own,
                    // so the `rx.is_empty()` re-check below observes it and
                    // we keep draining instead of dropping it.
                    let retired = queues
                        .remove_if(&key, |_, existing| existing.same_channel(&tx))
                        .is_some();
                    if retired && rx.is_empty() {
                        break;
                    }
                }
            }
            // Best-effort cleanup for any exit path that didn't already
            // retire the entry above (e.g. `rx.recv()` returning `None`).
            queues.remove_if(&key, |_, existing| existing.same_channel(&tx));
        })
    }
}
