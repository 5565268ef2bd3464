//! Interrupt-side helpers

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-flag handoff from an interrupt context to the motion tick
///
/// Uses only atomic load and store, which every Cortex-M core supports.
/// A raise that lands between `take`'s load and store is lost. The edge
/// being consumed has already latched the switch, and the pin is read
/// again on every tick.
pub struct EdgeLatch {
    raised: AtomicBool,
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Record a confirmed edge. Never blocks.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Consume a pending edge
    pub fn take(&self) -> bool {
        if self.raised.load(Ordering::Acquire) {
            self.raised.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

/// Minimum spacing between accepted edges
#[derive(Debug, Clone, Copy)]
pub struct EdgeFilter {
    window_ms: u64,
    last_accepted_ms: Option<u64>,
}

impl EdgeFilter {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_accepted_ms: None,
        }
    }

    /// Whether an edge at `now_ms` falls outside the window of the last
    /// accepted one; accepted edges restart the window
    pub fn accept(&mut self, now_ms: u64) -> bool {
        let accepted = match self.last_accepted_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.window_ms,
            None => true,
        };
        if accepted {
            self.last_accepted_ms = Some(now_ms);
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_take_consumes() {
        let latch = EdgeLatch::new();
        assert!(!latch.take());
        latch.raise();
        latch.raise();
        assert!(latch.is_raised());
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn test_latch_raise_after_take_is_kept() {
        let latch = EdgeLatch::new();
        latch.raise();
        assert!(latch.take());
        latch.raise();
        assert!(latch.take());
        assert!(!latch.is_raised());
    }

    #[test]
    fn test_filter_window() {
        let mut filter = EdgeFilter::new(50);
        assert!(filter.accept(1000));
        assert!(!filter.accept(1020));
        assert!(!filter.accept(1049));
        assert!(filter.accept(1050));
        assert!(!filter.accept(1060));
    }
}
