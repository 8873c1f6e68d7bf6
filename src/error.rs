//! Error kinds the dispatcher distinguishes.

use crate::facade::FacadeError;
use thiserror::Error;

/// Errors surfaced by [`crate::dispatcher::EventDispatcher::handle_event`].
///
/// Parameterized over the caller's reconciler error type, following
/// `kube_runtime::controller::Error<ReconcilerErr, QueueErr>`'s pattern of
/// keeping user error types concrete instead of boxing them away.
#[derive(Debug, Error)]
pub enum DispatchError<ReconcilerErr>
where
    ReconcilerErr: std::error::Error + 'static,
{
    /// User reconciliation code failed. Propagate; retry per the event's
    /// retry policy.
    #[error("reconciler failed: {0}")]
    Reconciler(#[source] ReconcilerErr),

    /// The resource façade failed, either from an optimistic-lock conflict
    /// or a transport error. Both are retryable.
    #[error("resource facade failed: {0}")]
    Facade(#[source] FacadeError),

    /// A verdict or resource violated an invariant the dispatcher relies on
    /// (e.g. a missing uid). Fatal; not retryable.
    #[error("programming error: {0}")]
    Programming(#[from] ProgrammingError),
}

/// Programming errors: conditions that should never occur if the watch
/// source and reconciler honor their contracts. Distinct from business and
/// transport errors because retrying them can't help.
#[derive(Debug, Error)]
pub enum ProgrammingError {
    #[error("resource has no metadata.uid")]
    MissingUid,
}

impl<ReconcilerErr> DispatchError<ReconcilerErr>
where
    ReconcilerErr: std::error::Error + 'static,
{
    /// Programming errors are fatal and must not be retried; every other
    /// kind is retryable per the event's retry policy. Lets an event source
    /// apply that propagation policy without downcasting.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, DispatchError::Programming(_))
    }
}
