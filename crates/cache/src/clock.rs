use std::sync::Arc;
use time::UtcDateTime;

/// Source of "now" for staleness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

pub type ClockHandle = Arc<dyn Clock + Send + Sync>;

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub UtcDateTime);
impl Clock for FixedClock {
    fn now(&self) -> UtcDateTime {
        self.0
    }
}
