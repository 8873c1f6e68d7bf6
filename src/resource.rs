//! The opaque per-kind resource abstraction the dispatcher operates over.

use std::fmt::Debug;

/// The subset of Kubernetes-standard object metadata the dispatcher needs.
///
/// A custom resource type is otherwise opaque to this crate: the framework
/// mutates only `finalizers`, never any other field, and reads the other
/// four fields purely to drive the decision procedure in
/// [`crate::dispatcher::EventDispatcher::handle_event`].
pub trait ManagedResource: Clone + Debug + Send + Sync + 'static {
    /// Stable identity for the object across its lifetime, used as the
    /// generation-cache key. `None` should not occur for an object that has
    /// actually been persisted by the API server.
    fn uid(&self) -> Option<&str>;

    /// Monotonic integer bumped by the API server whenever `spec` changes.
    fn generation(&self) -> Option<i64>;

    /// Opaque optimistic-concurrency token.
    fn resource_version(&self) -> Option<&str>;

    /// Set by the API server once deletion has been requested.
    fn deletion_timestamp(&self) -> Option<&str>;

    /// `true` once the API server has recorded a deletion request.
    fn is_terminating(&self) -> bool {
        self.deletion_timestamp().is_some()
    }

    /// Ordered finalizer list; deletion is deferred while it's non-empty.
    fn finalizers(&self) -> &[String];

    /// Mutable access, used only by the dispatcher to add or remove its own
    /// finalizer entry.
    fn finalizers_mut(&mut self) -> &mut Vec<String>;

    /// `true` iff `name` is present in `finalizers()`.
    fn has_finalizer(&self, name: &str) -> bool {
        self.finalizers().iter().any(|f| f == name)
    }
}
