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

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    observer::{Notice, Observer},
    schedule::Keyframe,
};

pub mod http;
pub mod log;
pub mod mock;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("device rejected the request: {0}")]
    Failure(String),
    #[error("device did not answer within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The body of a live push. With `on` unset the device goes back to following its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePush {
    pub lights: Keyframe,
    #[serde(default = "default_on")]
    pub on: bool,
}

fn default_on() -> bool {
    true
}

/// Something that can show a lighting state right now.
#[async_trait]
pub trait Gateway: fmt::Display + Send + Sync {
    /// Shows `state` on the device, or releases the override when `on` is false.
    async fn push_preview(&self, state: &Keyframe, on: bool) -> Result<(), GatewayError>;
}

/// Gets a gateway for the given device. Names starting with `mock` get a mock, `log` only
/// logs, and anything else is taken as the base URL of a device.
pub fn get_gateway(device: &str, timeout: Duration) -> Result<Arc<dyn Gateway>, GatewayError> {
    if device.starts_with("mock") {
        return Ok(Arc::new(mock::Gateway::get(device)));
    }
    if device == "log" {
        return Ok(Arc::new(log::Gateway::new()));
    }
    Ok(Arc::new(http::Device::new(device, timeout)?))
}

/// Pushes a state, giving up after `timeout`.
pub async fn push(
    gateway: &dyn Gateway,
    state: &Keyframe,
    on: bool,
    timeout: Duration,
) -> Result<(), GatewayError> {
    match tokio::time::timeout(timeout, gateway.push_preview(state, on)).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Timeout(timeout)),
    }
}

enum Request {
    Push(Keyframe, bool),
    Flush(oneshot::Sender<()>),
}

/// A queue of pushes handled one at a time, in the order they were sent. Senders never wait
/// for the device unless they flush. Failures are reported to the observer.
pub struct Lane {
    sender: mpsc::UnboundedSender<Request>,
    join: JoinHandle<()>,
}

impl Lane {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        observer: Arc<dyn Observer>,
        timeout: Duration,
    ) -> Lane {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Request>();
        let join = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let (state, on) = match request {
                    Request::Push(state, on) => (state, on),
                    Request::Flush(done) => {
                        // The flusher may have given up waiting.
                        let _ = done.send(());
                        continue;
                    }
                };
                debug!(device = %gateway, time = %state.start_time, on, "Pushing state.");
                if let Err(e) = push(gateway.as_ref(), &state, on, timeout).await {
                    warn!(device = %gateway, err = %e, "Error pushing state.");
                    observer.notify(Notice::PushFailed(e.to_string()));
                }
            }
        });
        Lane { sender, join }
    }

    pub fn send(&self, state: Keyframe, on: bool) {
        if self.sender.send(Request::Push(state, on)).is_err() {
            warn!("Push lane is closed, dropping state.");
        }
    }

    /// Waits for every push sent so far to finish. The lane stays open.
    pub async fn flush(&self) {
        let (done, finished) = oneshot::channel();
        if self.sender.send(Request::Flush(done)).is_err() {
            warn!("Push lane is closed, nothing to flush.");
            return;
        }
        if finished.await.is_err() {
            warn!("Push lane stopped before flushing.");
        }
    }

    /// Waits for every queued push to finish.
    pub async fn close(self) {
        drop(self.sender);
        if let Err(e) = self.join.await {
            warn!(err = %e, "Push lane task failed.");
        }
    }
}
