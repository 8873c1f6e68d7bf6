//! Event dispatcher: the central state machine.

use crate::{
    config::ControllerConfig,
    error::{DispatchError, ProgrammingError},
    event::{Event, EventAction},
    facade::ResourceFacade,
    generation_cache::GenerationCache,
    reconciler::{Context, Reconciler},
    resource::ManagedResource,
    verdict::Verdict,
};
use std::sync::Arc;
use tracing::{debug, info_span, warn, Instrument};

/// Consumes a stream of custom-resource events one at a time, via
/// [`Self::handle_event`]: enforces finalizer discipline, invokes the user
/// reconciliation callback, interprets its verdict, persists resulting
/// mutations through a [`ResourceFacade`], and performs generation-aware
/// deduplication and retry.
///
/// `handle_event` is synchronous with respect to its caller: it suspends
/// only inside calls to the reconciler and the façade, never spawns a task
/// of its own, and never sleeps or polls. Concurrency across different
/// resource UIDs is the caller's responsibility; the only state shared
/// across concurrent calls is the generation cache, which is safe for
/// concurrent access.
pub struct EventDispatcher<K, R, F>
where
    K: ManagedResource,
    R: Reconciler<K>,
    F: ResourceFacade<K>,
{
    reconciler: R,
    facade: F,
    config: ControllerConfig,
    cache: GenerationCache,
}

impl<K, R, F> EventDispatcher<K, R, F>
where
    K: ManagedResource,
    R: Reconciler<K>,
    F: ResourceFacade<K>,
{
    pub fn new(reconciler: R, facade: F, config: ControllerConfig) -> Self {
        Self {
            reconciler,
            facade,
            config,
            cache: GenerationCache::new(),
        }
    }

    /// The generation cache backing this dispatcher, mostly useful for
    /// tests and for inspection by an embedding application.
    pub fn generation_cache(&self) -> &GenerationCache {
        &self.cache
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The dispatcher's single public operation.
    ///
    /// Decision procedure, applied in order, first match wins:
    /// 1. generation gate
    /// 2. deletion path (if `deletionTimestamp` is set)
    /// 3. reconcile path (otherwise)
    ///
    /// On any error from the callback or the façade, the generation cache is
    /// left untouched and the error is propagated so the event source can
    /// apply the event's retry policy.
    pub async fn handle_event(
        &self,
        event: Event<K>,
        ctx: Context<R::Context>,
    ) -> Result<(), DispatchError<R::Error>> {
        let uid = event
            .resource
            .uid()
            .ok_or(ProgrammingError::MissingUid)?
            .to_string();
        let span = info_span!("handle_event", resource.uid = %uid, event.action = ?event.action);
        self.handle_event_inner(event, ctx, &uid).instrument(span).await
    }

    async fn handle_event_inner(
        &self,
        event: Event<K>,
        ctx: Context<R::Context>,
        uid: &str,
    ) -> Result<(), DispatchError<R::Error>> {
        if event.action == EventAction::Error {
            // Error events trigger the retry policy without invoking the
            // callback; there is nothing further for the dispatcher to do.
            debug!("error event received, deferring to the event's retry policy");
            return Ok(());
        }

        if event.action == EventAction::Deleted {
            // Informational only: the object is already gone from the API
            // server, so reconciliation is not meaningful.
            self.reconciler.on_deleted(Arc::clone(&event.resource), ctx).await;
            return Ok(());
        }

        let generation = event.resource.generation().unwrap_or_default();

        // 1. Generation gate: a change that didn't bump `generation` is not
        // a spec change, and this controller has already seen this spec.
        if self.config.generation_aware() && !self.cache.should_process(uid, generation) {
            debug!(generation, "generation already processed, skipping");
            return Ok(());
        }

        let result = if event.resource.is_terminating() {
            self.dispatch_deletion(Arc::clone(&event.resource), ctx).await
        } else {
            self.dispatch_reconcile(Arc::clone(&event.resource), ctx).await
        };

        result?;
        if self.config.generation_aware() {
            self.cache.mark_processed(uid, generation);
        }
        Ok(())
    }

    /// Deletion path: invoked when `deletionTimestamp` is set.
    async fn dispatch_deletion(
        &self,
        resource: Arc<K>,
        ctx: Context<R::Context>,
    ) -> Result<(), DispatchError<R::Error>> {
        if !resource.has_finalizer(self.config.finalizer_name()) {
            // Deletion is in progress and is not our concern; some other
            // controller (or none) owns the terminal step.
            debug!("deletion in progress without our finalizer, not invoking delete");
            return Ok(());
        }

        let finished = self
            .reconciler
            .delete(Arc::clone(&resource), ctx)
            .await
            .map_err(|err| {
                warn!(error = %err, "delete callback failed, propagating for retry");
                DispatchError::Reconciler(err)
            })?;

        if !finished {
            // Cleanup reconciliation must succeed before it's safe to
            // remove the finalizer; persist nothing and try again later.
            debug!("cleanup incomplete, finalizer retained");
            return Ok(());
        }

        let mut next = (*resource).clone();
        let finalizer_name = self.config.finalizer_name();
        next.finalizers_mut().retain(|f| f != finalizer_name);
        self.facade
            .replace_with_lock(next)
            .await
            .map_err(|err| {
                warn!(error = %err, "finalizer-removal replace failed, propagating for retry");
                DispatchError::Facade(err)
            })?;
        debug!("cleanup complete, finalizer removed");
        Ok(())
    }

    /// Reconcile path: invoked when `deletionTimestamp` is not set.
    async fn dispatch_reconcile(
        &self,
        resource: Arc<K>,
        ctx: Context<R::Context>,
    ) -> Result<(), DispatchError<R::Error>> {
        let finalizer_name = self.config.finalizer_name();
        let dispatcher_added_finalizer = !resource.has_finalizer(finalizer_name);

        let observed = if dispatcher_added_finalizer {
            // The finalizer must be present before the callback runs, so it
            // observes the resource in the form that will be persisted, and
            // so the finalizer is guaranteed present before any work that
            // might need to be undone on deletion.
            let mut with_finalizer = (*resource).clone();
            with_finalizer.finalizers_mut().push(finalizer_name.to_string());
            Arc::new(with_finalizer)
        } else {
            resource
        };

        let verdict = self
            .reconciler
            .create_or_update(Arc::clone(&observed), ctx)
            .await
            .map_err(|err| {
                warn!(error = %err, "create_or_update callback failed, propagating for retry");
                DispatchError::Reconciler(err)
            })?;

        match verdict {
            Verdict::UpdateResource(r) => {
                self.facade.replace_with_lock(r).await.map_err(|err| {
                    warn!(error = %err, "replace_with_lock failed, propagating for retry");
                    DispatchError::Facade(err)
                })?;
            }
            Verdict::UpdateStatus(r) => {
                self.facade.update_status(r).await.map_err(|err| {
                    warn!(error = %err, "update_status failed, propagating for retry");
                    DispatchError::Facade(err)
                })?;
            }
            Verdict::UpdateResourceAndStatus(r) => {
                let replaced = self.facade.replace_with_lock(r).await.map_err(|err| {
                    warn!(error = %err, "replace_with_lock failed, propagating for retry");
                    DispatchError::Facade(err)
                })?;
                self.facade.update_status(replaced).await.map_err(|err| {
                    warn!(error = %err, "update_status failed, propagating for retry");
                    DispatchError::Facade(err)
                })?;
            }
            Verdict::NoUpdate => {
                if dispatcher_added_finalizer {
                    // The callback persisted nothing, but the dispatcher
                    // still needs to persist the finalizer edit it made.
                    self.facade
                        .replace_with_lock((*observed).clone())
                        .await
                        .map_err(|err| {
                            warn!(error = %err, "finalizer-only replace failed, propagating for retry");
                            DispatchError::Facade(err)
                        })?;
                }
            }
        }
        Ok(())
    }
}
