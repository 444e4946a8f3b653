//! Clock capability
//!
//! Business logic never reads the wall clock directly: services hold an
//! `Arc<dyn Clock>` so schedules and timestamps are reproducible in tests.

use chrono::{Local, NaiveDateTime};
use parking_lot::RwLock;

pub trait Clock: Send + Sync {
    /// Current local date-time (the business timezone of the deployment)
    fn now(&self) -> NaiveDateTime;

    /// Current time as Unix millis, used for `created_at` / `updated_at`
    fn now_millis(&self) -> i64 {
        self.now().and_utc().timestamp_millis()
    }
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }
}

/// Frozen clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    at: RwLock<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self {
            at: RwLock::new(at),
        }
    }

    pub fn set(&self, at: NaiveDateTime) {
        *self.at.write() = at;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut at = self.at.write();
        *at += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.at.read()
    }
}
