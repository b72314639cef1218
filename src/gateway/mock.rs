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

use std::{collections::VecDeque, fmt, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use super::GatewayError;
use crate::schedule::Keyframe;

/// A mock gateway. Records every push it completes, and can be told to stall or fail.
pub struct Gateway {
    name: String,
    pushes: Mutex<Vec<(Keyframe, bool)>>,
    delays: Mutex<VecDeque<Duration>>,
    failing: Mutex<bool>,
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mock ({})", self.name)
    }
}

impl Gateway {
    /// Gets the given mock gateway.
    pub fn get(name: &str) -> Gateway {
        Gateway {
            name: name.to_string(),
            pushes: Mutex::new(Vec::new()),
            delays: Mutex::new(VecDeque::new()),
            failing: Mutex::new(false),
        }
    }

    /// Every completed push, oldest first.
    pub fn pushes(&self) -> Vec<(Keyframe, bool)> {
        self.pushes.lock().clone()
    }

    pub fn push_count(&self) -> usize {
        self.pushes.lock().len()
    }

    /// Makes the next push that doesn't already have a delay take this long.
    pub fn delay_next(&self, delay: Duration) {
        self.delays.lock().push_back(delay);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

#[async_trait]
impl super::Gateway for Gateway {
    async fn push_preview(&self, state: &Keyframe, on: bool) -> Result<(), GatewayError> {
        let delay = self.delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.failing.lock() {
            return Err(GatewayError::Failure(format!("{} is failing", self.name)));
        }

        info!(
            device = %self.name,
            time = %state.start_time,
            intensity = state.intensity,
            on,
            "Mock push."
        );
        self.pushes.lock().push((state.clone(), on));
        Ok(())
    }
}
