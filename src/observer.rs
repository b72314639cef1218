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

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    interpolate::InterpolationError,
    schedule::{Keyframe, ScheduleError, TimeOfDay},
    session::Mode,
};

/// Something a view layer may want to redraw or report.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Selected { index: usize, keyframe: Keyframe },
    Inserted { index: usize, keyframe: Keyframe },
    Updated { index: usize, keyframe: Keyframe },
    Deleted { index: usize, keyframe: Keyframe },
    /// An edit was refused and the schedule is unchanged.
    Rejected(ScheduleError),
    /// A preview frame is about to be pushed.
    Frame(Keyframe),
    PreviewFinished,
    PreviewFailed(InterpolationError),
    PushFailed(String),
    MarkerMoved(TimeOfDay),
    ModeChanged(Mode),
    Saved,
}

/// Receives notices from the engine. Implementations must not block.
pub trait Observer: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl Observer for mpsc::UnboundedSender<Notice> {
    fn notify(&self, notice: Notice) {
        // Nobody listening is fine.
        let _ = self.send(notice);
    }
}

/// Writes notices to the log.
pub struct LogObserver {}

impl Observer for LogObserver {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Selected { index, keyframe } => {
                info!(index, time = %keyframe.start_time, "Selected keyframe.")
            }
            Notice::Inserted { index, keyframe } => info!(
                index,
                time = %keyframe.start_time,
                intensity = keyframe.intensity,
                "Inserted keyframe."
            ),
            Notice::Updated { index, keyframe } => info!(
                index,
                time = %keyframe.start_time,
                intensity = keyframe.intensity,
                "Updated keyframe."
            ),
            Notice::Deleted { index, keyframe } => {
                info!(index, time = %keyframe.start_time, "Deleted keyframe.")
            }
            Notice::Frame(frame) => debug!(
                time = %frame.start_time,
                intensity = frame.intensity,
                channels = ?frame.intensities,
                "Preview frame."
            ),
            Notice::MarkerMoved(time) => debug!(time = %time, "Now marker moved."),
            Notice::Saved => info!("Schedule saved."),
            // Logged where they happen.
            Notice::Rejected(_)
            | Notice::PreviewFinished
            | Notice::PreviewFailed(_)
            | Notice::PushFailed(_)
            | Notice::ModeChanged(_) => {}
        }
    }
}
