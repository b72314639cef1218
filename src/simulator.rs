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

use std::{io, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Json, State as Extract},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    clock::Clock,
    gateway::{
        http::{LIVE_PATH, SCHEDULE_PATH},
        LivePush,
    },
    schedule::{Keyframe, Levels, Schedule, TimeOfDay},
};

const STATUS_PATH: &str = "/api/status";

struct Device {
    schedule: Schedule,
    live: Option<Keyframe>,
}

/// A simulated lighting controller: a stored schedule plus an optional live override.
#[derive(Clone)]
pub struct State {
    device: Arc<RwLock<Device>>,
    clock: Arc<dyn Clock>,
}

impl State {
    pub fn new(schedule: Schedule, clock: Arc<dyn Clock>) -> State {
        State {
            device: Arc::new(RwLock::new(Device {
                schedule,
                live: None,
            })),
            clock,
        }
    }

    pub fn schedule(&self) -> Schedule {
        self.device.read().schedule.clone()
    }

    /// The live override, if one is active.
    pub fn live(&self) -> Option<Keyframe> {
        self.device.read().live.clone()
    }
}

/// What the simulated fixture is showing.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub time: TimeOfDay,
    pub live: bool,
    pub output: Levels,
}

pub fn router(state: State) -> Router {
    Router::new()
        .route(SCHEDULE_PATH, get(get_schedule).post(set_schedule))
        .route(LIVE_PATH, post(set_live))
        .route(STATUS_PATH, get(get_status))
        .with_state(state)
}

/// Runs the simulator until the process is stopped.
pub async fn serve(bind: SocketAddr, state: State) -> Result<(), io::Error> {
    let listener = TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, "Simulator listening.");
    axum::serve(listener, router(state)).await
}

async fn get_schedule(Extract(state): Extract<State>) -> Json<Schedule> {
    Json(state.schedule())
}

async fn set_schedule(
    Extract(state): Extract<State>,
    Json(schedule): Json<Schedule>,
) -> StatusCode {
    info!(keyframes = schedule.len(), "Storing schedule.");
    state.device.write().schedule = schedule;
    StatusCode::NO_CONTENT
}

async fn set_live(Extract(state): Extract<State>, Json(push): Json<LivePush>) -> StatusCode {
    let mut device = state.device.write();
    if push.on {
        info!(
            time = %push.lights.start_time,
            intensity = push.lights.intensity,
            "Live override."
        );
        device.live = Some(push.lights);
    } else {
        info!("Live override released.");
        device.live = None;
    }
    StatusCode::NO_CONTENT
}

async fn get_status(
    Extract(state): Extract<State>,
) -> Result<Json<Status>, (StatusCode, String)> {
    let time = state.clock.now();
    let device = state.device.read();
    let (live, output) = match &device.live {
        Some(lights) => (true, lights.weighted_intensities()),
        None => match device.schedule.output_at(time) {
            Ok(output) => (false, output),
            Err(e) => {
                warn!(err = %e, "Unable to compute output.");
                return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
            }
        },
    };
    Ok(Json(Status { time, live, output }))
}
