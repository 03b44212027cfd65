//! Deterministic pool teardown.
//!
//! Statics are never dropped in Rust, so the pool of the global instance
//! would otherwise live until the OS reclaims the process. Hold a
//! [`ShutdownGuard`] for the lifetime of `main`:
//!
//! ```no_run
//! use qqmusic_api::QQMusic;
//!
//! # async fn run() {
//! let _guard = QQMusic::global().shutdown_guard();
//! // ... requests ...
//! # }
//! // every pooled client is dropped here
//! ```

use crate::client::QQMusic;

/// Closes every pooled connection of a [`QQMusic`] when dropped.
///
/// Dropping is best-effort and never panics; if the pool was already shut
/// down the guard does nothing.
#[must_use = "the pool is drained as soon as the guard is dropped"]
pub struct ShutdownGuard<'a> {
    client: &'a QQMusic,
    armed: bool,
}

impl<'a> ShutdownGuard<'a> {
    pub(crate) fn new(client: &'a QQMusic) -> Self {
        Self {
            client,
            armed: true,
        }
    }

    /// Drop the guard without closing the pool.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ShutdownGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.client.shutdown();
        }
    }
}
