//! Wall-clock access.
//!
//! Every "today" in MyCoach is a civil date in one configured time zone.
//! Components never call `Timestamp::now()` directly; they ask a [`Clock`],
//! so tests can pin the date and step it forward.

use std::sync::Mutex;

use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};

use crate::error::CoreError;

pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Timestamp;

    /// The zone used to turn instants into calendar dates.
    fn time_zone(&self) -> TimeZone;

    /// The current calendar date in [`Clock::time_zone`].
    fn today(&self) -> Date {
        self.now().to_zoned(self.time_zone()).date()
    }
}

/// Reads the system clock.
#[derive(Debug, Clone)]
pub struct SystemClock {
    tz: TimeZone,
}

impl SystemClock {
    pub fn new(tz: TimeZone) -> Self {
        Self { tz }
    }

    /// Use the host's configured time zone, falling back to UTC when it
    /// cannot be determined.
    pub fn system() -> Self {
        Self::new(TimeZone::try_system().unwrap_or(TimeZone::UTC))
    }

    /// Use a named IANA zone such as `America/Denver`.
    pub fn named(name: &str) -> Result<Self, CoreError> {
        Ok(Self::new(TimeZone::get(name)?))
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn time_zone(&self) -> TimeZone {
        self.tz.clone()
    }
}

/// A manually driven clock, always in UTC.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// A clock reading noon UTC on `date`.
    pub fn on(date: Date) -> Result<Self, CoreError> {
        Ok(Self::new(noon_utc(date)?))
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Move the clock to noon UTC on `date`.
    pub fn set_date(&self, date: Date) -> Result<(), CoreError> {
        self.set(noon_utc(date)?);
        Ok(())
    }

    pub fn advance(&self, by: SignedDuration) -> Result<(), CoreError> {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.checked_add(by)?;
        Ok(())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn time_zone(&self) -> TimeZone {
        TimeZone::UTC
    }
}

fn noon_utc(date: Date) -> Result<Timestamp, CoreError> {
    Ok(date.at(12, 0, 0, 0).to_zoned(TimeZone::UTC)?.timestamp())
}
