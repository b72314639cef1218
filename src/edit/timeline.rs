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

use crate::schedule::{Keyframe, Schedule, TimeOfDay, MINUTES_PER_DAY};

/// A position on the timeline canvas. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Primary,
    Secondary,
}

/// Maps between the canvas and the schedule. The x axis runs from 00:00 to 23:59 and the y
/// axis from full intensity at the top to dark at the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timeline {
    width: f64,
    height: f64,
    hit_tolerance: f64,
}

impl Default for Timeline {
    fn default() -> Self {
        Timeline::new(960.0, 400.0, 6.0)
    }
}

impl Timeline {
    pub fn new(width: f64, height: f64, hit_tolerance: f64) -> Timeline {
        Timeline {
            width: width.max(1.0),
            height: height.max(1.0),
            hit_tolerance: hit_tolerance.max(0.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn last_minute() -> f64 {
        f64::from(MINUTES_PER_DAY - 1)
    }

    pub fn x_of(&self, time: TimeOfDay) -> f64 {
        f64::from(time.minutes()) / Self::last_minute() * self.width
    }

    pub fn y_of(&self, intensity: u8) -> f64 {
        self.height - f64::from(intensity) / 255.0 * self.height
    }

    /// The time under `x`, clamped to the day.
    pub fn time_at(&self, x: f64) -> TimeOfDay {
        let x = x.clamp(0.0, self.width);
        TimeOfDay::from_minutes((x / self.width * Self::last_minute()).round() as u32)
    }

    /// The intensity under `y`, clamped to the canvas.
    pub fn intensity_at(&self, y: f64) -> u8 {
        let y = y.clamp(0.0, self.height);
        ((self.height - y) / self.height * 255.0).round() as u8
    }

    pub fn position_of(&self, keyframe: &Keyframe) -> Point {
        Point::new(self.x_of(keyframe.start_time), self.y_of(keyframe.intensity))
    }

    /// The keyframe whose marker is nearest to `pos`, if any is within the hit tolerance.
    pub fn hit_test(&self, schedule: &Schedule, pos: Point) -> Option<usize> {
        schedule
            .iter()
            .enumerate()
            .map(|(index, keyframe)| {
                let marker = self.position_of(keyframe);
                (index, (marker.x - pos.x).hypot(marker.y - pos.y))
            })
            .filter(|(_, distance)| *distance <= self.hit_tolerance)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod test {
    use crate::testutil::schedule;

    use super::*;

    fn timeline() -> Timeline {
        Timeline::new(1439.0, 255.0, 5.0)
    }

    #[test]
    fn test_axes() {
        let timeline = timeline();
        assert_eq!(0.0, timeline.x_of(TimeOfDay::MIDNIGHT));
        assert_eq!(1439.0, timeline.x_of(TimeOfDay::LAST_MINUTE));
        assert_eq!(255.0, timeline.y_of(0));
        assert_eq!(0.0, timeline.y_of(255));

        assert_eq!("12:00", timeline.time_at(720.0).to_string());
        assert_eq!("00:00", timeline.time_at(-50.0).to_string());
        assert_eq!("23:59", timeline.time_at(5000.0).to_string());
        assert_eq!(255, timeline.intensity_at(-10.0));
        assert_eq!(0, timeline.intensity_at(400.0));
        assert_eq!(128, timeline.intensity_at(127.0));
    }

    #[test]
    fn test_hit_test() {
        let timeline = timeline();
        let schedule = schedule(&[("08:00", 0), ("08:06", 0), ("12:00", 255)]);

        assert_eq!(
            Some(0),
            timeline.hit_test(&schedule, Point::new(481.0, 253.0))
        );
        assert_eq!(
            Some(1),
            timeline.hit_test(&schedule, Point::new(484.0, 255.0))
        );
        assert_eq!(Some(2), timeline.hit_test(&schedule, Point::new(720.0, 0.0)));
        assert_eq!(None, timeline.hit_test(&schedule, Point::new(600.0, 100.0)));
    }
}
