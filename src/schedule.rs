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

use std::slice;

use serde::{Deserialize, Serialize};

use crate::interpolate::{self, InterpolationError};

mod error;
mod keyframe;
mod time;

pub use error::ScheduleError;
pub use keyframe::{Keyframe, Levels, CHANNELS};
pub use time::{TimeOfDay, MINUTES_PER_DAY};

/// A day-long lighting program: keyframes with strictly increasing start times.
///
/// The schedule never re-sorts itself. Mutations that would break the ordering are
/// rejected, and a keyframe inserted at either end of the day is forced to zero
/// intensity so that the day fades from and to darkness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleDocument", into = "ScheduleDocument")]
pub struct Schedule {
    keyframes: Vec<Keyframe>,
}

/// The wire representation used by the device settings API.
#[derive(Serialize, Deserialize)]
struct ScheduleDocument {
    schedule: Vec<Keyframe>,
}

impl TryFrom<ScheduleDocument> for Schedule {
    type Error = ScheduleError;

    fn try_from(document: ScheduleDocument) -> Result<Self, Self::Error> {
        Schedule::new(document.schedule)
    }
}

impl From<Schedule> for ScheduleDocument {
    fn from(schedule: Schedule) -> Self {
        ScheduleDocument {
            schedule: schedule.keyframes,
        }
    }
}

impl Default for Schedule {
    /// Dark from 09:00 to 17:00.
    fn default() -> Self {
        Schedule {
            keyframes: vec![
                Keyframe::dark(TimeOfDay::from_minutes(9 * 60)),
                Keyframe::dark(TimeOfDay::from_minutes(17 * 60)),
            ],
        }
    }
}

impl Schedule {
    /// Creates a schedule from keyframes that must already be in strictly increasing time order.
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Schedule, ScheduleError> {
        if let Some(index) = keyframes
            .windows(2)
            .position(|pair| pair[0].start_time >= pair[1].start_time)
        {
            return Err(ScheduleError::OutOfOrder { index: index + 1 });
        }
        Ok(Schedule { keyframes })
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn iter(&self) -> slice::Iter<'_, Keyframe> {
        self.keyframes.iter()
    }

    /// Inserts a keyframe at the given position. A keyframe that becomes the first or
    /// last of the day has its intensity forced to zero.
    pub fn insert(&mut self, index: usize, mut keyframe: Keyframe) -> Result<(), ScheduleError> {
        let len = self.keyframes.len();
        if index > len {
            return Err(ScheduleError::InvalidIndex { index, len });
        }

        let prev = index.checked_sub(1).and_then(|i| self.keyframes.get(i));
        let next = self.keyframes.get(index);
        if !Self::fits_between(prev, keyframe.start_time, next) {
            return Err(ScheduleError::OutOfOrder { index });
        }

        if index == 0 || index == len {
            keyframe.intensity = 0;
        }
        self.keyframes.insert(index, keyframe);
        Ok(())
    }

    /// Removes the keyframe at the given position. Keeping at least one keyframe is the
    /// caller's responsibility.
    pub fn remove(&mut self, index: usize) -> Result<Keyframe, ScheduleError> {
        let len = self.keyframes.len();
        if index >= len {
            return Err(ScheduleError::InvalidIndex { index, len });
        }
        Ok(self.keyframes.remove(index))
    }

    /// Moves a keyframe in time and changes its master intensity.
    pub fn update(
        &mut self,
        index: usize,
        start_time: TimeOfDay,
        intensity: u8,
    ) -> Result<(), ScheduleError> {
        self.check_index(index)?;
        let (prev, next) = self.neighbors(index);
        if !Self::fits_between(prev, start_time, next) {
            return Err(ScheduleError::OutOfOrder { index });
        }

        let keyframe = &mut self.keyframes[index];
        keyframe.start_time = start_time;
        keyframe.intensity = intensity;
        Ok(())
    }

    /// Replaces the master intensity and channel levels of a keyframe, leaving its time alone.
    pub fn set_levels(
        &mut self,
        index: usize,
        intensity: u8,
        intensities: Levels,
    ) -> Result<(), ScheduleError> {
        self.check_index(index)?;
        let keyframe = &mut self.keyframes[index];
        keyframe.intensity = intensity;
        keyframe.intensities = intensities;
        Ok(())
    }

    /// The keyframes immediately before and after the given position.
    pub fn neighbors(&self, index: usize) -> (Option<&Keyframe>, Option<&Keyframe>) {
        let prev = index.checked_sub(1).and_then(|i| self.keyframes.get(i));
        let next = index.checked_add(1).and_then(|i| self.keyframes.get(i));
        (prev, next)
    }

    /// The position a keyframe starting at `time` would occupy.
    pub fn insertion_index(&self, time: TimeOfDay) -> usize {
        self.keyframes.partition_point(|k| k.start_time <= time)
    }

    /// The adjacent pair of keyframes with `a.start_time <= time < b.start_time`.
    pub fn segment_at(&self, time: TimeOfDay) -> Option<(&Keyframe, &Keyframe)> {
        let next = self.insertion_index(time);
        if next == 0 || next >= self.keyframes.len() {
            return None;
        }
        Some((&self.keyframes[next - 1], &self.keyframes[next]))
    }

    /// The weighted channel output the device shows at `time`. Outside of the first and last
    /// keyframes the lights are off.
    pub fn output_at(&self, time: TimeOfDay) -> Result<Levels, InterpolationError> {
        match self.segment_at(time) {
            Some((a, b)) => interpolate::weighted(time, a, b),
            None => Ok([0; CHANNELS]),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), ScheduleError> {
        let len = self.keyframes.len();
        if index >= len {
            return Err(ScheduleError::InvalidIndex { index, len });
        }
        Ok(())
    }

    fn fits_between(prev: Option<&Keyframe>, time: TimeOfDay, next: Option<&Keyframe>) -> bool {
        prev.map_or(true, |prev| prev.start_time < time)
            && next.map_or(true, |next| time < next.start_time)
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a Keyframe;
    type IntoIter = slice::Iter<'a, Keyframe>;

    fn into_iter(self) -> Self::IntoIter {
        self.keyframes.iter()
    }
}
