// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use chrono::{Local, Timelike};
use parking_lot::Mutex;

use crate::schedule::TimeOfDay;

/// The wall clock, as a time of day.
pub trait Clock: Send + Sync {
    fn now(&self) -> TimeOfDay;
}

/// The local system clock.
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now(&self) -> TimeOfDay {
        let now = Local::now();
        TimeOfDay::from_minutes(now.hour() * 60 + now.minute())
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<TimeOfDay>,
}

impl FixedClock {
    pub fn new(now: TimeOfDay) -> FixedClock {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: TimeOfDay) {
        *self.now.lock() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> TimeOfDay {
        *self.now.lock()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new("06:15".parse().expect("time"));
        assert_eq!("06:15", clock.now().to_string());
        clock.set("18:45".parse().expect("time"));
        assert_eq!("18:45", clock.now().to_string());
    }

    #[test]
    fn test_system_clock_is_a_valid_time() {
        assert!(SystemClock {}.now() <= TimeOfDay::LAST_MINUTE);
    }
}
