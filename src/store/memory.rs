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
use parking_lot::Mutex;

use super::{ScheduleStore, StoreError};
use crate::schedule::Schedule;

/// Keeps the schedule in memory. Used when the device has no storage of its own.
pub struct Store {
    schedule: Mutex<Schedule>,
    saves: Mutex<usize>,
}

impl Store {
    pub fn new(schedule: Schedule) -> Store {
        Store {
            schedule: Mutex::new(schedule),
            saves: Mutex::new(0),
        }
    }

    /// The number of times the schedule has been saved.
    pub fn saves(&self) -> usize {
        *self.saves.lock()
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule.lock().clone()
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Memory")
    }
}

#[async_trait]
impl ScheduleStore for Store {
    async fn load(&self) -> Result<Schedule, StoreError> {
        Ok(self.schedule())
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        *self.schedule.lock() = schedule.clone();
        *self.saves.lock() += 1;
        Ok(())
    }
}
