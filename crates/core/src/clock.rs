//! Time source abstraction
//!
//! Relative expressions such as "demain" are resolved against the clock, so
//! the orchestrator takes one by injection.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Current instant in the clinic timezone.
pub trait Clock: Send + Sync {
    /// The present instant, expressed in the clinic timezone.
    fn now(&self) -> DateTime<Tz>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    /// Wall clock reporting instants in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Tz>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;

    use super::*;

    #[test]
    fn system_clock_reports_configured_timezone() {
        assert_eq!(SystemClock::new(Paris).now().timezone(), Paris);
    }

    #[test]
    fn fixed_clock_never_moves() {
        let instant = Paris.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let clock = FixedClock(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }
}
