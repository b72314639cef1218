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

use std::{
    future::Future,
    time::{Duration, Instant},
};

use crate::schedule::{Keyframe, Schedule, CHANNELS};

/// A keyframe at the given `HH:MM` time with all channels dark.
pub fn keyframe(time: &str, intensity: u8) -> Keyframe {
    Keyframe::new(time.parse().expect("valid time"), intensity, [0; CHANNELS])
}

/// A schedule built from `(time, intensity)` pairs, which must be in order.
pub fn schedule(points: &[(&str, u8)]) -> Schedule {
    Schedule::new(
        points
            .iter()
            .map(|(time, intensity)| keyframe(time, *intensity))
            .collect(),
    )
    .expect("ordered schedule")
}

/// Wait for the given async predicate to return true or fail.
pub async fn eventually_async<F, Fut>(mut predicate: F, error_msg: &str)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let mut tick = Duration::from_millis(5);
    let max_tick = Duration::from_millis(100);
    let timeout = Duration::from_secs(5);

    loop {
        if start.elapsed() > timeout {
            panic!("{}", error_msg);
        }
        if predicate().await {
            return;
        }

        tokio::time::sleep(tick).await;
        tick = std::cmp::min(tick * 2, max_tick);
    }
}
