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
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::{error, info, span, warn, Instrument, Level, Span};

use crate::{
    gateway::{self, Gateway},
    observer::{Notice, Observer},
    playback::{Playback, PlaybackSpeed},
    playsync::CancelHandle,
    schedule::{Keyframe, Schedule, ScheduleError},
};

struct PreviewHandles {
    join: JoinHandle<()>,
    cancel: CancelHandle,
}

/// Plays schedule snapshots to a gateway in accelerated time.
///
/// Only one preview runs at a time. Starting a new one cancels the old one and waits for it
/// to finish, including any push it has in flight, so frames from two previews never
/// interleave at the device.
pub struct Previewer {
    gateway: Arc<dyn Gateway>,
    observer: Arc<dyn Observer>,
    tick: Duration,
    push_timeout: Duration,
    speed: PlaybackSpeed,
    active: Arc<AtomicBool>,
    handles: Option<PreviewHandles>,
    span: Span,
}

impl Previewer {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        observer: Arc<dyn Observer>,
        tick: Duration,
        speed: PlaybackSpeed,
        push_timeout: Duration,
    ) -> Previewer {
        Previewer {
            gateway,
            observer,
            tick,
            push_timeout,
            speed,
            active: Arc::new(AtomicBool::new(false)),
            handles: None,
            span: span!(Level::INFO, "preview"),
        }
    }

    /// The speed shared with every preview this previewer runs.
    pub fn speed(&self) -> &PlaybackSpeed {
        &self.speed
    }

    /// A flag that is set while a preview is running.
    pub fn active(&self) -> Arc<AtomicBool> {
        self.active.clone()
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Starts previewing a snapshot of the given schedule.
    pub async fn start(&mut self, schedule: Schedule) -> Result<(), ScheduleError> {
        self.stop().await;

        let mut playback = Playback::new(schedule, self.speed.clone());
        playback.start()?;

        let _enter = self.span.enter();
        info!(
            minutes_per_tick = self.speed.get(),
            tick = ?self.tick,
            "Starting preview."
        );

        let cancel = CancelHandle::new();
        self.active.store(true, Ordering::Release);
        let join = tokio::spawn(
            Previewer::run(
                playback,
                self.gateway.clone(),
                self.observer.clone(),
                self.tick,
                self.push_timeout,
                cancel.clone(),
                self.active.clone(),
            )
            .instrument(self.span.clone()),
        );
        self.handles = Some(PreviewHandles { join, cancel });
        Ok(())
    }

    /// Cancels the running preview and waits for it to wind down.
    pub async fn stop(&mut self) {
        let Some(handles) = self.handles.take() else {
            return;
        };
        handles.cancel.cancel();
        if let Err(e) = handles.join.await {
            error!(err = %e, "Preview task failed.");
        }
        self.active.store(false, Ordering::Release);
    }

    /// Waits for the running preview to play out.
    pub async fn wait(&mut self) {
        if let Some(handles) = self.handles.take() {
            if let Err(e) = handles.join.await {
                error!(err = %e, "Preview task failed.");
            }
        }
    }

    async fn run(
        mut playback: Playback,
        gateway: Arc<dyn Gateway>,
        observer: Arc<dyn Observer>,
        tick: Duration,
        push_timeout: Duration,
        cancel: CancelHandle,
        active: Arc<AtomicBool>,
    ) {
        let push = |state: Keyframe| {
            let gateway = gateway.clone();
            let observer = observer.clone();
            async move {
                observer.notify(Notice::Frame(state.clone()));
                if let Err(e) = gateway::push(gateway.as_ref(), &state, true, push_timeout).await
                {
                    warn!(time = %state.start_time, err = %e, "Unable to push preview frame.");
                    observer.notify(Notice::PushFailed(e.to_string()));
                }
            }
        };

        loop {
            if cancel.is_cancelled() {
                info!("Preview cancelled.");
                break;
            }

            let step = match playback.tick() {
                Ok(Some(step)) => step,
                Ok(None) => {
                    observer.notify(Notice::PreviewFinished);
                    break;
                }
                Err(e) => {
                    error!(err = %e, "Preview stopped.");
                    observer.notify(Notice::PreviewFailed(e));
                    break;
                }
            };

            // The next frame is only computed once this push has settled.
            push(step.frame).await;

            if let Some(last) = step.last {
                if !cancel.is_cancelled() {
                    push(last).await;
                    info!("Preview finished.");
                    observer.notify(Notice::PreviewFinished);
                }
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(tick) => {}
                _ = cancel.cancelled() => {}
            }
        }

        active.store(false, Ordering::Release);
    }
}
