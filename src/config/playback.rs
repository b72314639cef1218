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

use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use crate::schedule::MINUTES_PER_DAY;

use super::error::ConfigError;

pub const DEFAULT_TICK: Duration = Duration::from_millis(10);
pub const DEFAULT_SPEED: u32 = 5;
pub const DEFAULT_PUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// A YAML representation of the preview playback configuration.
#[derive(Deserialize, Clone, Default)]
pub struct Playback {
    /// How long to wait between preview frames.
    tick: Option<String>,

    /// How many virtual minutes each frame advances.
    speed: Option<u32>,

    /// How long a single push to the device may take.
    push_timeout: Option<String>,
}

impl Playback {
    pub fn tick(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.tick, DEFAULT_TICK)
    }

    pub fn speed(&self) -> Result<u32, ConfigError> {
        match self.speed {
            Some(0) => Err(ConfigError::Invalid(
                "playback speed must be at least one minute per tick".to_string(),
            )),
            Some(speed) if speed > u32::from(MINUTES_PER_DAY) => Err(ConfigError::Invalid(
                format!("playback speed must be at most {MINUTES_PER_DAY} minutes per tick"),
            )),
            Some(speed) => Ok(speed),
            None => Ok(DEFAULT_SPEED),
        }
    }

    pub fn push_timeout(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.push_timeout, DEFAULT_PUSH_TIMEOUT)
    }
}

pub(super) fn parse_duration(
    duration: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    duration.as_ref().map_or(Ok(default), |duration| {
        Ok(DurationString::from_string(duration.clone())?.into())
    })
}
