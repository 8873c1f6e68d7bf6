//! Callback contract: `create_or_update` and `delete`.

use crate::{resource::ManagedResource, verdict::Verdict};
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only shared state passed through to both callback methods.
///
/// Mirrors `kube_runtime::controller::Context<T>`: an `Arc<T>` wrapper so
/// reconciler authors get a read-only view of the world (a client handle,
/// static config, ...) without threading it through every call by hand.
#[derive(Debug)]
pub struct Context<T>(Arc<T>);

impl<T> Context<T> {
    pub fn new(state: T) -> Self {
        Context(Arc::new(state))
    }

    pub fn get_ref(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> Arc<T> {
        self.0
    }
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Context(Arc::clone(&self.0))
    }
}

/// User-supplied reconciliation logic for one custom resource kind.
///
/// Exactly two required operations, modeled as a trait rather than a class
/// hierarchy — no deep hierarchy is warranted for two methods.
#[async_trait]
pub trait Reconciler<K>: Send + Sync
where
    K: ManagedResource,
{
    /// The error type business logic fails with. Surfaced to the caller of
    /// [`crate::dispatcher::EventDispatcher::handle_event`] unchanged; the
    /// generation cache is left untouched so a replay reprocesses the same
    /// generation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Application state threaded through via [`Context`].
    type Context: Send + Sync;

    /// Ensure the actual state matches the state desired by `resource`.
    ///
    /// Invoked for `Added`/`Modified` events while the resource is not being
    /// deleted. `resource` already carries the dispatcher's own finalizer —
    /// added before this call if it wasn't already present — so reconciler
    /// authors always observe the form that will be persisted.
    ///
    /// Must be idempotent: a retry, a missed watch event, or a cold restart
    /// can all cause this to be called again for the same generation.
    async fn create_or_update(
        &self,
        resource: Arc<K>,
        ctx: Context<Self::Context>,
    ) -> Result<Verdict<K>, Self::Error>;

    /// Finalize `resource` ahead of deletion.
    ///
    /// Invoked once `deletionTimestamp` is set and the dispatcher's
    /// finalizer is present. Returning `Ok(true)` means finalization is
    /// complete and the finalizer may be removed; `Ok(false)` means the
    /// resource stays in terminating state and a future event will retry.
    ///
    /// Must tolerate `create_or_update` never having run, or never having
    /// succeeded, and must itself be idempotent.
    async fn delete(&self, resource: Arc<K>, ctx: Context<Self::Context>) -> Result<bool, Self::Error>;

    /// Optional hook for `Deleted` watch events: informational only, since
    /// the object is already gone from the API server by the time this
    /// fires. The default implementation drops the event.
    async fn on_deleted(&self, _resource: Arc<K>, _ctx: Context<Self::Context>) {}
}

#[async_trait]
impl<K, T> Reconciler<K> for Arc<T>
where
    K: ManagedResource,
    T: Reconciler<K> + ?Sized,
{
    type Error = T::Error;
    type Context = T::Context;

    async fn create_or_update(
        &self,
        resource: Arc<K>,
        ctx: Context<Self::Context>,
    ) -> Result<Verdict<K>, Self::Error> {
        (**self).create_or_update(resource, ctx).await
    }

    async fn delete(&self, resource: Arc<K>, ctx: Context<Self::Context>) -> Result<bool, Self::Error> {
        (**self).delete(resource, ctx).await
    }

    async fn on_deleted(&self, resource: Arc<K>, ctx: Context<Self::Context>) {
        (**self).on_deleted(resource, ctx).await
    }
}
