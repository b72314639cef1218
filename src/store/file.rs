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
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tracing::info;

use super::{ScheduleStore, StoreError};
use crate::schedule::Schedule;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Yaml,
    Json,
}

/// A schedule kept in a local YAML or JSON file, chosen by extension. Both use the same
/// `{schedule: [...]}` document the device API uses.
pub struct Store {
    path: PathBuf,
    format: Format,
}

impl Store {
    pub fn new(path: &Path) -> Result<Store, StoreError> {
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Format::Yaml,
            Some("json") => Format::Json,
            _ => return Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(Store {
            path: path.to_path_buf(),
            format,
        })
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File ({})", self.path.display())
    }
}

#[async_trait]
impl ScheduleStore for Store {
    /// Loads the schedule. A missing file is the default schedule.
    async fn load(&self) -> Result<Schedule, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No schedule file, using the default.");
                return Ok(Schedule::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(match self.format {
            Format::Yaml => serde_yml::from_str(&contents)?,
            Format::Json => serde_json::from_str(&contents)?,
        })
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let contents = match self.format {
            Format::Yaml => serde_yml::to_string(schedule)?,
            Format::Json => serde_json::to_string_pretty(schedule)?,
        };
        tokio::fs::write(&self.path, contents).await?;
        info!(path = %self.path.display(), keyframes = schedule.len(), "Saved schedule.");
        Ok(())
    }
}
