//! Background sync dispatch.
//!
//! Only the form-submission tag is recognized. Its handler is a placeholder:
//! there is no offline submission queue to replay yet.

/// Result of dispatching a sync tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Handled,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct BackgroundSync {
    tag: String,
}

impl BackgroundSync {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn dispatch(&self, tag: &str) -> SyncOutcome {
        if tag == self.tag {
            tracing::info!(tag, "background sync fired; no queued form submissions to replay");
            SyncOutcome::Handled
        } else {
            tracing::debug!(tag, "ignoring unknown background sync tag");
            SyncOutcome::Ignored
        }
    }
}
