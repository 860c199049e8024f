use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use aura_types::Timestamp;

/// Source of "now" for genesis, seeding, and appends without a caller time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually driven clock. Makes genesis and seeding reproducible.
#[derive(Debug)]
pub struct FixedClock {
    now_ms: AtomicU64,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now_ms: AtomicU64::new(now.as_millis()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(Timestamp::from_millis(1_000));
        assert_eq!(clock.now().as_millis(), 1_000);
        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now().as_millis(), 3_000);
    }

    #[test]
    fn shared_clock_delegates() {
        let clock = std::sync::Arc::new(FixedClock::new(Timestamp::from_millis(5)));
        assert_eq!(Clock::now(&clock).as_millis(), 5);
    }
}
