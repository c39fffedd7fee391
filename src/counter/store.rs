use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The node's copy of the shared counter.
///
/// The value only moves up: by one on a local increment, or to a larger value reported
/// by a peer. Merging keeps the maximum, so increments made independently on two nodes
/// do not add up; after exchanging values both nodes hold the larger of the two counts.
#[derive(Debug, Default)]
pub struct CounterStore {
    value: AtomicU64,
}

impl CounterStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds one and returns the new value.
    ///
    /// Saturates at `u64::MAX`: once a peer has reported the maximum, further
    /// increments leave it there instead of wrapping to zero.
    pub fn increment(&self) -> u64 {
        match self
            .value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
        {
            Ok(previous) => previous + 1,
            Err(saturated) => saturated,
        }
    }

    pub fn read(&self) -> u64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Adopts `candidate` iff it is larger than the stored value.
    ///
    /// Returns the value after the merge and whether it changed.
    pub fn merge_received(&self, candidate: u64) -> (u64, bool) {
        let previous = self.value.fetch_max(candidate, Ordering::SeqCst);

        if candidate > previous {
            (candidate, true)
        } else {
            (previous, false)
        }
    }
}
