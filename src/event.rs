//! The dispatched unit.

use crate::retry::RetryPolicy;
use std::sync::Arc;

/// The watch-protocol action that produced an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// A new object was observed.
    Added,
    /// An existing object changed. The dispatcher treats `Added` and
    /// `Modified` identically; both enter the reconcile path.
    Modified,
    /// The object is gone from the API server. Informational only — by the
    /// time this arrives reconciliation is no longer meaningful.
    Deleted,
    /// The watch source itself failed to produce a well-formed event.
    /// Triggers the event's retry policy without invoking the callback.
    Error,
}

/// Immutable triple: action, resource snapshot, retry policy.
///
/// Policies are values, not singletons: each event carries its own so that
/// different event sources — or different retries of the same object — can
/// apply different schedules.
#[derive(Debug, Clone)]
pub struct Event<K> {
    pub action: EventAction,
    /// The resource as observed at the moment the event was emitted.
    pub resource: Arc<K>,
    pub retry_policy: RetryPolicy,
}

impl<K> Event<K> {
    pub fn new(action: EventAction, resource: Arc<K>, retry_policy: RetryPolicy) -> Self {
        Self {
            action,
            resource,
            retry_policy,
        }
    }
}
