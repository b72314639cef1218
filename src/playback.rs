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

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crate::{
    interpolate::{self, InterpolationError},
    schedule::{Keyframe, Schedule, ScheduleError, TimeOfDay, MINUTES_PER_DAY},
};

/// Virtual minutes advanced per tick, between one and a whole day. Clones share the same
/// value, so the speed can be changed while a preview is running.
#[derive(Debug, Clone)]
pub struct PlaybackSpeed(Arc<AtomicU32>);

impl PlaybackSpeed {
    pub fn new(minutes_per_tick: u32) -> PlaybackSpeed {
        PlaybackSpeed(Arc::new(AtomicU32::new(clamp_speed(minutes_per_tick))))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Sets the speed. Zero would stall playback, so it's raised to one. Anything past a
    /// day is lowered to a day.
    pub fn set(&self, minutes_per_tick: u32) {
        self.0.store(clamp_speed(minutes_per_tick), Ordering::Relaxed);
    }
}

fn clamp_speed(minutes_per_tick: u32) -> u32 {
    minutes_per_tick.clamp(1, u32::from(MINUTES_PER_DAY))
}

/// One step of playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    /// The interpolated state at the virtual time before this tick advanced.
    pub frame: Keyframe,
    /// Set when this tick ran off the end of the schedule. It holds the last keyframe,
    /// which should be shown once more before playback stops.
    pub last: Option<Keyframe>,
}

#[derive(Debug)]
struct Cursor {
    /// The most recent keyframe reached.
    active: Keyframe,
    /// Index of the keyframe being approached.
    next_index: usize,
    /// Virtual clock in minutes since midnight.
    virtual_minutes: u32,
}

/// Steps through a schedule snapshot at an adjustable speed.
///
/// Playback owns its snapshot, so edits made while it runs have no effect on it.
#[derive(Debug)]
pub struct Playback {
    schedule: Schedule,
    speed: PlaybackSpeed,
    cursor: Option<Cursor>,
}

impl Playback {
    pub fn new(schedule: Schedule, speed: PlaybackSpeed) -> Playback {
        Playback {
            schedule,
            speed,
            cursor: None,
        }
    }

    /// Starts from the first keyframe. A schedule needs two keyframes to play.
    pub fn start(&mut self) -> Result<(), ScheduleError> {
        let len = self.schedule.len();
        let first = match self.schedule.get(0) {
            Some(first) if len >= 2 => first.clone(),
            _ => return Err(ScheduleError::TooFewKeyframes { len }),
        };
        self.cursor = Some(Cursor {
            virtual_minutes: u32::from(first.start_time.minutes()),
            active: first,
            next_index: 1,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        self.cursor = None;
    }

    pub fn is_running(&self) -> bool {
        self.cursor.is_some()
    }

    /// The current virtual time, if running.
    pub fn virtual_time(&self) -> Option<TimeOfDay> {
        self.cursor
            .as_ref()
            .map(|cursor| TimeOfDay::from_minutes(cursor.virtual_minutes))
    }

    /// Produces the frame for the current virtual time and then advances the clock.
    /// Returns `None` once playback has stopped.
    pub fn tick(&mut self) -> Result<Option<Tick>, InterpolationError> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        let Some(next) = self.schedule.get(cursor.next_index) else {
            self.cursor = None;
            return Ok(None);
        };

        let now = TimeOfDay::from_minutes(cursor.virtual_minutes);
        let frame = match interpolate::interpolate(now, &cursor.active, next) {
            Ok(frame) => frame,
            Err(e) => {
                self.cursor = None;
                return Err(e);
            }
        };

        cursor.virtual_minutes = cursor.virtual_minutes.saturating_add(self.speed.get());

        // A fast speed can pass several keyframes in one tick.
        while let Some(next) = self.schedule.get(cursor.next_index) {
            if cursor.virtual_minutes < u32::from(next.start_time.minutes()) {
                break;
            }
            cursor.active = next.clone();
            cursor.next_index += 1;
        }

        let last = if cursor.next_index >= self.schedule.len() {
            let last = cursor.active.clone();
            self.cursor = None;
            Some(last)
        } else {
            None
        };

        Ok(Some(Tick { frame, last }))
    }
}
