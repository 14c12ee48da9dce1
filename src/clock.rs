use std::time::SystemTime;

use crate::timestamp::Timestamp;
use crate::zone::Zone;

/// Source of the current moment.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// The host wall clock, viewed in a zone (the local zone by default).
#[derive(Debug, Clone)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new(zone: Zone) -> Self {
        SystemClock { zone }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new(Zone::local())
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_system_time(SystemTime::now(), self.zone.clone())
    }
}

/// A clock stopped at one moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0.clone()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic_enough() {
        let clock = SystemClock::new(Zone::utc());
        let t1 = clock.now();
        let t2 = clock.now();
        assert!((t1.unix_seconds(), t1.nanos()) <= (t2.unix_seconds(), t2.nanos()));
        assert!(t1.zone().is_utc());
    }

    #[test]
    fn fixed_clock() {
        let at = Timestamp::new(1_700_000_000, 0, Zone::utc());
        let clock = FixedClock(at.clone());
        assert_eq!(clock.now(), at);
        assert_eq!((&clock).now(), at);
    }
}
