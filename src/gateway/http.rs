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

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use super::{GatewayError, LivePush};
use crate::{
    schedule::{Keyframe, Schedule},
    store::{ScheduleStore, StoreError},
};

pub const SCHEDULE_PATH: &str = "/api/settings/lighting/schedule";
pub const LIVE_PATH: &str = "/api/lighting/live";

/// A lighting controller reachable over HTTP. It shows live states and also stores the
/// schedule it runs.
pub struct Device {
    base_url: String,
    client: Client,
}

impl Device {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Device, GatewayError> {
        Ok(Device {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP ({})", self.base_url)
    }
}

#[async_trait]
impl super::Gateway for Device {
    async fn push_preview(&self, state: &Keyframe, on: bool) -> Result<(), GatewayError> {
        let body = LivePush {
            lights: state.clone(),
            on,
        };
        debug!(url = %self.url(LIVE_PATH), on, "Pushing live state.");
        self.client
            .post(self.url(LIVE_PATH))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[async_trait]
impl ScheduleStore for Device {
    async fn load(&self) -> Result<Schedule, StoreError> {
        let schedule = self
            .client
            .get(self.url(SCHEDULE_PATH))
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(GatewayError::from)?
            .json::<Schedule>()
            .await
            .map_err(GatewayError::from)?;
        info!(device = %self, keyframes = schedule.len(), "Loaded schedule.");
        Ok(schedule)
    }

    async fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        self.client
            .post(self.url(SCHEDULE_PATH))
            .json(schedule)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(GatewayError::from)?;
        info!(device = %self, keyframes = schedule.len(), "Saved schedule.");
        Ok(())
    }
}

#[cfg(all(test, feature = "simulator"))]
mod test {
    use std::{sync::Arc, time::Duration};

    use tokio::net::TcpListener;

    use crate::{
        clock::FixedClock,
        gateway::Gateway,
        simulator,
        testutil::{keyframe, schedule},
    };

    use super::*;

    async fn start_simulator(schedule: Schedule) -> (String, simulator::State) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        let state = simulator::State::new(
            schedule,
            Arc::new(FixedClock::new("12:00".parse().expect("time"))),
        );
        let router = simulator::router(state.clone());
        tokio::spawn(async move { axum::serve(listener, router).await });
        (format!("http://{}", address), state)
    }

    #[tokio::test]
    async fn test_schedule_round_trip() {
        let (url, state) = start_simulator(Schedule::default()).await;
        let device = Device::new(&url, Duration::from_secs(5)).expect("device");

        assert_eq!(Schedule::default(), device.load().await.expect("load"));

        let updated = schedule(&[("08:00", 0), ("12:00", 255), ("20:00", 0)]);
        device.save(&updated).await.expect("save");
        assert_eq!(updated, state.schedule());
        assert_eq!(updated, device.load().await.expect("load"));
    }

    #[tokio::test]
    async fn test_live_push() {
        let (url, state) = start_simulator(Schedule::default()).await;
        let device = Device::new(&format!("{}/", url), Duration::from_secs(5)).expect("device");

        let mut lights = keyframe("12:00", 255);
        lights.intensities = [255, 0, 0, 0, 0, 0, 0];
        device.push_preview(&lights, true).await.expect("push");
        assert_eq!(Some(lights.clone()), state.live());

        device.push_preview(&lights, false).await.expect("release");
        assert_eq!(None, state.live());
    }

    #[tokio::test]
    async fn test_unreachable_device() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("address");
        drop(listener);

        let device = Device::new(&format!("http://{}", address), Duration::from_secs(1))
            .expect("device");
        let result = device.push_preview(&keyframe("12:00", 1), true).await;
        assert!(matches!(result, Err(GatewayError::Http(_))));
    }
}
