//! The reconcile verdict: the only way a [`crate::Reconciler`] can ask the
//! dispatcher to persist something.

/// Outcome of a `createOrUpdate` reconciliation.
///
/// Constructed directly by reconciler authors; the dispatcher interprets
/// these by case analysis at the single dispatch site in
/// [`crate::dispatcher::EventDispatcher::handle_event`]. There is
/// deliberately no fifth variant and no subclassing — the shape is closed.
#[derive(Debug, Clone)]
pub enum Verdict<K> {
    /// Persist `resource` with an optimistic-lock replace.
    UpdateResource(K),
    /// Persist only `resource.status`, via the status subresource.
    UpdateStatus(K),
    /// Persist both, in that order: `replace_with_lock` then `update_status`.
    UpdateResourceAndStatus(K),
    /// The world already matches; persist nothing on behalf of the callback.
    NoUpdate,
}

impl<K> Verdict<K> {
    /// Borrow the resource a verdict carries, if any.
    pub fn resource(&self) -> Option<&K> {
        match self {
            Verdict::UpdateResource(r)
            | Verdict::UpdateStatus(r)
            | Verdict::UpdateResourceAndStatus(r) => Some(r),
            Verdict::NoUpdate => None,
        }
    }
}
