//! Resource façade: the dispatcher's sole mutation path.

use crate::resource::ManagedResource;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors the façade can report.
///
/// The only reason this abstraction exists is testability — allowing the
/// mutation layer to be substituted with a stub in tests — so it stays a
/// two-method trait with a closed, two-variant error set rather than
/// growing to cover every possible cluster failure.
#[derive(Debug, Error)]
pub enum FacadeError {
    /// Stale `resourceVersion`: the optimistic-lock precondition failed.
    /// Treated as retryable — a subsequent watch event carries a fresh
    /// snapshot that supersedes this one.
    #[error("optimistic lock conflict: resourceVersion is stale")]
    Conflict,

    /// Network or API-server failure. Retryable.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl FacadeError {
    pub fn transport<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        FacadeError::Transport(Box::new(err))
    }
}

/// The two mutation shapes the dispatcher requires.
#[async_trait]
pub trait ResourceFacade<K>: Send + Sync
where
    K: ManagedResource,
{
    /// Full replace using `resource`'s `resourceVersion` as the
    /// precondition. Fails with [`FacadeError::Conflict`] if the
    /// precondition no longer holds.
    async fn replace_with_lock(&self, resource: K) -> Result<K, FacadeError>;

    /// Update only the `status` subresource; does not bump `generation`
    /// (the API server only increments `generation` on spec changes).
    async fn update_status(&self, resource: K) -> Result<K, FacadeError>;
}

#[async_trait]
impl<K, T> ResourceFacade<K> for Arc<T>
where
    K: ManagedResource,
    T: ResourceFacade<K> + ?Sized,
{
    async fn replace_with_lock(&self, resource: K) -> Result<K, FacadeError> {
        (**self).replace_with_lock(resource).await
    }

    async fn update_status(&self, resource: K) -> Result<K, FacadeError> {
        (**self).update_status(resource).await
    }
}
