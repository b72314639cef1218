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

use std::{fmt, path::PathBuf};

use async_trait::async_trait;

use crate::{
    gateway::GatewayError,
    schedule::{Schedule, ScheduleError},
};

pub mod file;
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unable to read or write schedule: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed YAML schedule: {0}")]
    Yaml(#[from] serde_yml::Error),
    #[error("malformed JSON schedule: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("unsupported schedule format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Where the schedule lives between sessions.
#[async_trait]
pub trait ScheduleStore: fmt::Display + Send + Sync {
    async fn load(&self) -> Result<Schedule, StoreError>;
    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError>;
}
