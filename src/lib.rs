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

//! A lighting-schedule engine for aquarium LED controllers: a day-long keyframe program,
//! interpolation, accelerated preview playback and the timeline edit protocol.

pub mod clock;
pub mod config;
pub mod controller;
pub mod edit;
pub mod gateway;
pub mod interpolate;
pub mod observer;
pub mod playback;
pub mod playsync;
pub mod preview;
pub mod schedule;
pub mod session;
#[cfg(feature = "simulator")]
pub mod simulator;
pub mod store;
#[cfg(test)]
mod testutil;
