//! Controller configuration: the labeled record with exactly three
//! recognized options.

/// Immutable per-controller-instance configuration.
///
/// This is the full controller declaration surface: no on-disk formats,
/// wire protocols, or CLI flags belong to this core. An embedding
/// application is expected to build one of these programmatically, the way
/// `kube_runtime::Controller`'s own builder methods are plain method calls
/// rather than a config file.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    crd_name: String,
    finalizer_name: String,
    generation_aware: bool,
}

impl ControllerConfig {
    /// `finalizer_name` defaults to `crd_name`, `generation_aware` defaults
    /// to `true`.
    pub fn new(crd_name: impl Into<String>) -> Self {
        let crd_name = crd_name.into();
        let finalizer_name = crd_name.clone();
        Self {
            crd_name,
            finalizer_name,
            generation_aware: true,
        }
    }

    #[must_use]
    pub fn with_finalizer_name(mut self, name: impl Into<String>) -> Self {
        self.finalizer_name = name.into();
        self
    }

    #[must_use]
    pub fn with_generation_aware(mut self, enabled: bool) -> Self {
        self.generation_aware = enabled;
        self
    }

    pub fn crd_name(&self) -> &str {
        &self.crd_name
    }

    pub fn finalizer_name(&self) -> &str {
        &self.finalizer_name
    }

    pub fn generation_aware(&self) -> bool {
        self.generation_aware
    }
}
