//! Sequence numbering for outbound frames.
//!
//! Every frame the bridge writes carries a header sequence number.  Providers
//! use it to pair replies with requests and to notice dropped frames; the
//! bridge itself never interprets inbound sequence numbers.
//!
//! One counter is shared by all sessions of a server, so numbers are unique
//! per process rather than per connection.

use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free, monotonically increasing counter.
///
/// Starts at 0 and wraps from `u64::MAX` back to 0.
///
/// ```rust
/// use tvremote_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(value: u64) -> Self {
        Self {
            inner: AtomicU64::new(value),
        }
    }

    /// Returns the next number and advances the counter.
    pub fn next(&self) -> u64 {
        // Relaxed: the value orders frames, it does not publish memory.
        self.inner.fetch_add(1, Ordering::Relaxed)
    }

    /// The value the next call to [`next`](Self::next) would return.
    pub fn peek(&self) -> u64 {
        self.inner.load(Ordering::Relaxed)
    }
}

impl Default for SequenceCounter {
    fn default() -> Self {
        Self::new()
    }
}
