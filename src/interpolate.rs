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

use std::array;

use crate::schedule::{Keyframe, Levels, TimeOfDay};

/// Raised when two keyframes share a start time. The schedule never allows this, so
/// seeing it means the ordering was broken upstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpolationError {
    #[error("zero-length segment at {time}, keyframe ordering is corrupt")]
    DivisionByZero { time: TimeOfDay },
}

/// Linearly blends keyframe `a` into the keyframe `b` that follows it, at `time`.
///
/// The day is treated as cyclic here, so a segment from 23:00 to 01:00 is two hours
/// long. Times outside of the segment are held at the nearest end. Every value is
/// rounded half away from zero, so the result at `a.start_time` is exactly `a` and the
/// result at `b.start_time` is exactly `b`.
pub fn interpolate(
    time: TimeOfDay,
    a: &Keyframe,
    b: &Keyframe,
) -> Result<Keyframe, InterpolationError> {
    let (elapsed, span) = progress(time, a, b)?;
    Ok(Keyframe {
        start_time: time,
        intensity: blend(a.intensity, b.intensity, elapsed, span),
        intensities: blend_levels(&a.intensities, &b.intensities, elapsed, span),
    })
}

/// Blends the weighted outputs of `a` and `b` at `time`. This is what the fixture itself
/// displays, as opposed to the editable keyframe values.
pub fn weighted(time: TimeOfDay, a: &Keyframe, b: &Keyframe) -> Result<Levels, InterpolationError> {
    let (elapsed, span) = progress(time, a, b)?;
    Ok(blend_levels(
        &a.weighted_intensities(),
        &b.weighted_intensities(),
        elapsed,
        span,
    ))
}

/// Minutes elapsed since `a` (clamped to the segment) and the segment length.
fn progress(
    time: TimeOfDay,
    a: &Keyframe,
    b: &Keyframe,
) -> Result<(u16, u16), InterpolationError> {
    let span = b.start_time.minutes_since(a.start_time);
    if span == 0 {
        return Err(InterpolationError::DivisionByZero { time: a.start_time });
    }

    let elapsed = time.minutes_since(a.start_time);
    if elapsed <= span {
        return Ok((elapsed, span));
    }

    // Outside of the segment: hold whichever end is closer.
    let before = a.start_time.minutes_since(time);
    let after = elapsed - span;
    Ok((if before <= after { 0 } else { span }, span))
}

fn blend_levels(a: &Levels, b: &Levels, elapsed: u16, span: u16) -> Levels {
    array::from_fn(|i| blend(a[i], b[i], elapsed, span))
}

/// `round(a + (b - a) * elapsed / span)` in integer arithmetic.
fn blend(a: u8, b: u8, elapsed: u16, span: u16) -> u8 {
    let (a, b) = (i64::from(a), i64::from(b));
    let (elapsed, span) = (i64::from(elapsed), i64::from(span));
    // The blended value is never negative, so flooring after adding one half rounds
    // half away from zero.
    ((2 * a * span + 2 * (b - a) * elapsed + span) / (2 * span)) as u8
}

#[cfg(test)]
mod test {
    use crate::schedule::CHANNELS;
    use crate::testutil::keyframe;

    use super::*;

    fn at(time: &str) -> TimeOfDay {
        time.parse().expect("valid time")
    }

    #[test]
    fn test_midpoint() -> Result<(), InterpolationError> {
        let a = keyframe("08:00", 100);
        let b = keyframe("10:00", 200);

        let result = interpolate(at("09:00"), &a, &b)?;
        assert_eq!(result.intensity, 150);
        assert_eq!(result.intensities, [0; CHANNELS]);
        assert_eq!(result.start_time, at("09:00"));
        Ok(())
    }

    #[test]
    fn test_boundaries_are_exact() -> Result<(), InterpolationError> {
        let a = Keyframe::new(at("06:10"), 3, [0, 17, 255, 3, 90, 1, 254]);
        let b = Keyframe::new(at("13:47"), 251, [255, 18, 0, 200, 91, 2, 0]);

        let start = interpolate(a.start_time, &a, &b)?;
        assert_eq!((start.intensity, start.intensities), (a.intensity, a.intensities));
        let end = interpolate(b.start_time, &a, &b)?;
        assert_eq!((end.intensity, end.intensities), (b.intensity, b.intensities));

        // Repeated queries agree.
        assert_eq!(interpolate(at("10:00"), &a, &b)?, interpolate(at("10:00"), &a, &b)?);
        Ok(())
    }

    #[test]
    fn test_monotonic_for_monotonic_inputs() -> Result<(), InterpolationError> {
        let a = Keyframe::new(at("07:00"), 10, [0, 10, 20, 30, 40, 50, 60]);
        let b = Keyframe::new(at("09:13"), 10, [255, 10, 21, 200, 41, 255, 61]);

        let mut previous = a.intensities;
        for minute in a.start_time.minutes()..=b.start_time.minutes() {
            let result = interpolate(TimeOfDay::from_minutes(minute.into()), &a, &b)?;
            for i in 0..CHANNELS {
                assert!(a.intensities[i] <= result.intensities[i]);
                assert!(result.intensities[i] <= b.intensities[i]);
                assert!(previous[i] <= result.intensities[i]);
            }
            previous = result.intensities;
        }
        Ok(())
    }

    #[test]
    fn test_rounds_half_away_from_zero() -> Result<(), InterpolationError> {
        // 0 -> 1 over two minutes is exactly 0.5 halfway.
        let a = keyframe("10:00", 0);
        let b = keyframe("10:02", 1);
        assert_eq!(interpolate(at("10:01"), &a, &b)?.intensity, 1);

        // 1 -> 0 is also 0.5 halfway, and still rounds up.
        let c = keyframe("10:00", 1);
        let d = keyframe("10:02", 0);
        assert_eq!(interpolate(at("10:01"), &c, &d)?.intensity, 1);
        Ok(())
    }

    #[test]
    fn test_wraps_across_midnight() -> Result<(), InterpolationError> {
        let a = keyframe("23:00", 0);
        let b = keyframe("01:00", 200);

        assert_eq!(interpolate(at("00:00"), &a, &b)?.intensity, 100);
        assert_eq!(interpolate(at("23:30"), &a, &b)?.intensity, 50);
        assert_eq!(interpolate(at("01:00"), &a, &b)?.intensity, 200);
        Ok(())
    }

    #[test]
    fn test_outside_segment_holds_nearest_end() -> Result<(), InterpolationError> {
        let a = keyframe("10:00", 40);
        let b = keyframe("12:00", 80);

        assert_eq!(interpolate(at("09:59"), &a, &b)?.intensity, 40);
        assert_eq!(interpolate(at("12:30"), &a, &b)?.intensity, 80);
        Ok(())
    }

    #[test]
    fn test_zero_length_segment() {
        let a = keyframe("10:00", 40);
        let b = keyframe("10:00", 80);

        assert_eq!(
            interpolate(at("10:00"), &a, &b),
            Err(InterpolationError::DivisionByZero { time: at("10:00") })
        );
        assert!(weighted(at("10:00"), &a, &b).is_err());
    }

    #[test]
    fn test_weighted() -> Result<(), InterpolationError> {
        let a = Keyframe::new(at("09:00"), 0, [100; CHANNELS]);
        let b = Keyframe::new(at("11:00"), 255, [20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(weighted(at("10:00"), &a, &b)?, [10, 15, 20, 25, 30, 35, 40]);
        Ok(())
    }
}
