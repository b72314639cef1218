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

use serde::Deserialize;

use super::error::ConfigError;
use crate::edit;

pub const DEFAULT_WIDTH: f64 = 960.0;
pub const DEFAULT_HEIGHT: f64 = 400.0;
pub const DEFAULT_HIT_TOLERANCE: f64 = 6.0;

/// A YAML representation of the timeline canvas.
#[derive(Deserialize, Clone, Default)]
pub struct Timeline {
    width: Option<f64>,
    height: Option<f64>,
    /// How close, in pixels, a pointer must be to a keyframe to grab it.
    hit_tolerance: Option<f64>,
}

impl Timeline {
    pub fn to_timeline(&self) -> Result<edit::Timeline, ConfigError> {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);
        let height = self.height.unwrap_or(DEFAULT_HEIGHT);
        let hit_tolerance = self.hit_tolerance.unwrap_or(DEFAULT_HIT_TOLERANCE);
        if width <= 0.0 || height <= 0.0 || hit_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "timeline of {}x{} with hit tolerance {} is not drawable",
                width, height, hit_tolerance
            )));
        }
        Ok(edit::Timeline::new(width, height, hit_tolerance))
    }
}
