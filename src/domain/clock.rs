use chrono::{Local, NaiveDateTime};

/// Wall-clock source for extraction stamps and run dates
pub trait RunClock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl RunClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant. Makes exports reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl RunClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
