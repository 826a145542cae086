//! Scoped Resource Handles
//!
//! Every listener and timer the engine acquires is held by one of these
//! guards. Dropping the guard releases the resource; releasing twice is
//! impossible because the release closure is taken on first use.

use std::fmt;

use tokio::task::JoinHandle;

/// Handle to a registered listener.
///
/// The listener stays registered until [`Subscription::dispose`] is called
/// or the handle is dropped.
#[must_use = "dropping a Subscription unregisters the listener immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wrap a release closure
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription that owns nothing
    pub fn empty() -> Self {
        Self { release: None }
    }

    /// Release the listener now
    pub fn dispose(mut self) {
        self.release_now();
    }

    /// Whether the listener has not been released yet
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Owns a spawned task and aborts it on drop.
#[derive(Debug)]
#[must_use = "dropping a TaskGuard aborts the task immediately"]
pub struct TaskGuard {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl TaskGuard {
    /// Take ownership of a spawned task
    pub fn new(name: &'static str, handle: JoinHandle<()>) -> Self {
        Self {
            name,
            handle: Some(handle),
        }
    }

    /// Task name used in logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the task has run to completion (or was aborted)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Abort the task now
    pub fn cancel(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::trace!(task = self.name, "Task aborted");
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.abort();
    }
}
