//! Shared, mutable holder for the active [`ThresholdConfig`].

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::ThresholdConfig;

static GLOBAL: LazyLock<ThresholdRegistry> = LazyLock::new(ThresholdRegistry::default);

/// A cloneable handle to one threshold value shared by every holder.
///
/// Writes replace the whole value; there is no versioning and no rollback.
#[derive(Debug, Clone, Default)]
pub struct ThresholdRegistry {
    inner: Arc<RwLock<ThresholdConfig>>,
}

impl ThresholdRegistry {
    /// Creates a registry holding `config`.
    #[must_use]
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replaces the active thresholds for every holder of this registry.
    pub fn set(&self, config: ThresholdConfig) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!(
            "Thresholds updated: low={} medium={} (was low={} medium={})",
            config.low,
            config.medium,
            guard.low,
            guard.medium
        );
        *guard = config;
    }

    /// Returns a copy of the active thresholds.
    #[must_use]
    pub fn get(&self) -> ThresholdConfig {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the copy a single render should use from start to finish.
    ///
    /// Alias of [`Self::get`], named for the call sites that hand the value
    /// to a renderer.
    #[must_use]
    pub fn snapshot(&self) -> ThresholdConfig {
        self.get()
    }
}

/// The process-wide registry used by the surrounding application.
#[must_use]
pub fn global() -> &'static ThresholdRegistry {
    &GLOBAL
}

/// Replaces the process-wide thresholds.
pub fn set_thresholds(config: ThresholdConfig) {
    GLOBAL.set(config);
}

/// Returns the process-wide thresholds.
#[must_use]
pub fn get_thresholds() -> ThresholdConfig {
    GLOBAL.get()
}
