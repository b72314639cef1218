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

use std::fmt;

use async_trait::async_trait;
use tracing::info;

use super::GatewayError;
use crate::schedule::Keyframe;

/// A gateway with no device behind it. Pushes are written to the log.
pub struct Gateway {}

impl Gateway {
    pub fn new() -> Gateway {
        Gateway {}
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Log")
    }
}

#[async_trait]
impl super::Gateway for Gateway {
    async fn push_preview(&self, state: &Keyframe, on: bool) -> Result<(), GatewayError> {
        info!(
            time = %state.start_time,
            intensity = state.intensity,
            channels = ?state.weighted_intensities(),
            on,
            "Lighting state."
        );
        Ok(())
    }
}
