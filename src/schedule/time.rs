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

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::ScheduleError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day with minute resolution. Has no date component and wraps at 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight, the first minute of the day.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    /// 23:59, the last minute of the day.
    pub const LAST_MINUTE: TimeOfDay = TimeOfDay(MINUTES_PER_DAY - 1);

    /// Creates a time of day from hours and minutes.
    pub fn new(hours: u16, minutes: u16) -> Result<TimeOfDay, ScheduleError> {
        if hours >= 24 || minutes >= 60 {
            return Err(ScheduleError::InvalidTime(format!(
                "{:02}:{:02}",
                hours, minutes
            )));
        }
        Ok(TimeOfDay(hours * 60 + minutes))
    }

    /// Creates a time of day from minutes since midnight, wrapping at 24h.
    pub fn from_minutes(minutes: u32) -> TimeOfDay {
        TimeOfDay((minutes % u32::from(MINUTES_PER_DAY)) as u16)
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Adds the given number of minutes, wrapping at 24h.
    pub fn add_minutes(&self, minutes: u32) -> TimeOfDay {
        TimeOfDay::from_minutes(u32::from(self.0) + minutes)
    }

    /// Minutes from `earlier` forward to this time, treating the day as cyclic.
    /// 08:00 since 23:00 is 540.
    pub fn minutes_since(&self, earlier: TimeOfDay) -> u16 {
        (self.0 + MINUTES_PER_DAY - earlier.0) % MINUTES_PER_DAY
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    /// Parses `H:MM` or `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime(s.to_string());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;
        if minutes.len() != 2 || hours.is_empty() || hours.len() > 2 {
            return Err(invalid());
        }
        let hours: u16 = hours.parse().map_err(|_| invalid())?;
        let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hours, minutes).map_err(|_| invalid())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
