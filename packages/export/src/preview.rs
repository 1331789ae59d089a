//! Transient in-memory artifact handles.
//!
//! A handle stands in for a browser object URL: it keeps the artifact bytes
//! reachable until someone releases it, or until its timer elapses. Release
//! is idempotent.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use crate::artifact::Artifact;

/// Lifetime of a handle created for a download.
pub const DOWNLOAD_RELEASE: Duration = Duration::from_secs(10);

/// Lifetime of a handle opened as a preview.
pub const PREVIEW_RELEASE: Duration = Duration::from_secs(60);

/// Reference to an open handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: Uuid,
    pub file_name: String,
    pub mime: &'static str,
}

/// Shared table of open handles. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    handles: Arc<Mutex<BTreeMap<Uuid, Arc<Artifact>>>>,
}

impl PreviewRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<Uuid, Arc<Artifact>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a handle on `artifact` and schedules its release after
    /// `release_after`.
    pub fn open(&self, artifact: Arc<Artifact>, release_after: Duration) -> PreviewHandle {
        let id = Uuid::new_v4();
        let handle = PreviewHandle {
            id,
            file_name: artifact.file_name(),
            mime: artifact.kind().mime(),
        };
        self.lock().insert(id, artifact);
        log::debug!(
            "open: handle {id} for {} (release in {}s)",
            handle.file_name,
            release_after.as_secs()
        );
        self.schedule_release(id, release_after);
        handle
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<Arc<Artifact>> {
        self.lock().get(&id).cloned()
    }

    /// Releases a handle. Returns `false` if it was already gone.
    pub fn release(&self, id: Uuid) -> bool {
        let released = self.lock().remove(&id).is_some();
        if released {
            log::debug!("release: handle {id}");
        }
        released
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Releases `id` once `after` has elapsed. Outside a tokio runtime the
    /// handle stays open until released explicitly.
    fn schedule_release(&self, id: Uuid, after: Duration) {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let registry = self.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(after).await;
                    registry.release(id);
                });
            }
            Err(_) => {
                log::debug!("schedule_release: no runtime, handle {id} needs an explicit release");
            }
        }
    }
}
