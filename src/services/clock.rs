use chrono::{Local, NaiveDate};

/// Source of "today" for past-date checks, injected so tests can pin the
/// calendar instead of depending on wall-clock time at render.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Production clock: the local calendar date (dates are compared at local
/// midnight, so a date is "past" only once the local day has rolled over).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Fixed clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
