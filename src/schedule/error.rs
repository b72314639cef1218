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

/// Errors raised by the schedule model. Edit operations neutralise these at the
/// edit controller boundary; they never leave the schedule partially modified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("index {index} is outside of the schedule (length {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("the schedule must keep at least one keyframe")]
    EmptyScheduleViolation,

    #[error("keyframe {index} would break the time ordering of the schedule")]
    OutOfOrder { index: usize },

    #[error("at least two keyframes are required, found {len}")]
    TooFewKeyframes { len: usize },

    #[error("invalid time of day: {0}")]
    InvalidTime(String),
}
