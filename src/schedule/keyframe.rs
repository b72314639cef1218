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

use serde::{Deserialize, Serialize};

use super::TimeOfDay;

/// The number of LED channels on the fixture.
pub const CHANNELS: usize = 7;

/// Per-channel levels, each 0-255.
pub type Levels = [u8; CHANNELS];

/// One scheduled lighting state, anchored to a time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// When this state is reached.
    pub start_time: TimeOfDay,
    /// Master intensity applied multiplicatively to every channel.
    pub intensity: u8,
    /// The channel levels.
    pub intensities: Levels,
}

impl Keyframe {
    /// Creates a new keyframe.
    pub fn new(start_time: TimeOfDay, intensity: u8, intensities: Levels) -> Keyframe {
        Keyframe {
            start_time,
            intensity,
            intensities,
        }
    }

    /// A keyframe with every level at zero.
    pub fn dark(start_time: TimeOfDay) -> Keyframe {
        Keyframe::new(start_time, 0, [0; CHANNELS])
    }

    /// The channel levels with the master intensity applied.
    pub fn weighted_intensities(&self) -> Levels {
        self.intensities.map(|level| weighted_level(level, self.intensity))
    }
}

/// `round(level * intensity / 255)`, half away from zero.
pub(crate) fn weighted_level(level: u8, intensity: u8) -> u8 {
    let product = 2 * u32::from(level) * u32::from(intensity);
    ((product + 255) / 510) as u8
}
