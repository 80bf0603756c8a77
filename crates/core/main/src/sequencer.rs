//! Latest-request-wins sequencing for refreshable views.

use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out monotonically increasing tickets for one view.
///
/// A refresh takes a ticket at entry and checks it before returning; a
/// stale ticket means a newer refresh was issued meanwhile and this
/// result must be discarded, so a slow early response can never
/// overwrite a fast later one.
#[derive(Debug, Default)]
pub struct ViewSequencer {
    latest: AtomicU64,
}

impl ViewSequencer {
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issues the next ticket, superseding all earlier ones.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether `ticket` is still the latest issued.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
