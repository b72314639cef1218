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
use tracing::{debug, info, span, warn, Level, Span};

use crate::{
    clock::Clock,
    edit::{Button, EditController, Point, Timeline},
    gateway::{Gateway, Lane},
    interpolate::{self, InterpolationError},
    observer::{Notice, Observer},
    playback::PlaybackSpeed,
    playsync::CancelHandle,
    preview::Previewer,
    schedule::{Keyframe, Levels, Schedule, ScheduleError, TimeOfDay},
    store::{ScheduleStore, StoreError},
};

/// What the device is currently being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The device follows its own schedule.
    Idle,
    /// Slider edits are pushed to the device as they happen.
    Live,
    /// A preview is playing.
    Previewing,
    /// A fixed state is held on the device for inspection. Live pushes are suppressed.
    Viewing,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub timeline: Timeline,
    pub tick: Duration,
    pub speed: u32,
    pub push_timeout: Duration,
    pub marker_refresh: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timeline: Timeline::default(),
            tick: Duration::from_millis(10),
            speed: 5,
            push_timeout: Duration::from_secs(2),
            marker_refresh: Duration::from_secs(60),
        }
    }
}

struct MarkerHandles {
    join: JoinHandle<()>,
    cancel: CancelHandle,
}

/// One open dashboard. The session owns the schedule and is the only thing that changes it.
pub struct Session {
    schedule: Schedule,
    selected: Option<usize>,
    dirty: bool,
    mode: Mode,
    edit: EditController,
    previewer: Previewer,
    lane: Lane,
    store: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn Observer>,
    marker: MarkerHandles,
    span: Span,
}

impl Session {
    /// Creates a session around a schedule. Must be called within a tokio runtime.
    pub fn new(
        schedule: Schedule,
        gateway: Arc<dyn Gateway>,
        store: Arc<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
        settings: Settings,
    ) -> Session {
        let previewer = Previewer::new(
            gateway.clone(),
            observer.clone(),
            settings.tick,
            PlaybackSpeed::new(settings.speed),
            settings.push_timeout,
        );
        let marker = Session::spawn_marker(
            clock.clone(),
            observer.clone(),
            previewer.active(),
            settings.marker_refresh,
        );
        Session {
            schedule,
            selected: None,
            dirty: false,
            mode: Mode::Idle,
            edit: EditController::new(settings.timeline, observer.clone()),
            previewer,
            lane: Lane::new(gateway, observer.clone(), settings.push_timeout),
            store,
            clock,
            observer,
            marker,
            span: span!(Level::INFO, "session"),
        }
    }

    /// Loads the schedule from the store and opens a session on it.
    pub async fn load(
        gateway: Arc<dyn Gateway>,
        store: Arc<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
        settings: Settings,
    ) -> Result<Session, StoreError> {
        let schedule = store.load().await?;
        info!(store = %store, keyframes = schedule.len(), "Loaded schedule.");
        Ok(Session::new(
            schedule, gateway, store, clock, observer, settings,
        ))
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn selected(&self) -> Option<(usize, &Keyframe)> {
        let index = self.selected?;
        self.schedule.get(index).map(|keyframe| (index, keyframe))
    }

    /// True when there are edits that haven't been saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mode(&self) -> Mode {
        if self.mode == Mode::Previewing && !self.previewer.is_running() {
            Mode::Idle
        } else {
            self.mode
        }
    }

    pub fn timeline(&self) -> &Timeline {
        self.edit.timeline()
    }

    /// The wall-clock time of day.
    pub fn now(&self) -> TimeOfDay {
        self.clock.now()
    }

    pub fn speed(&self) -> &PlaybackSpeed {
        self.previewer.speed()
    }

    pub async fn pointer_down(&mut self, pos: Point, button: Button) -> Option<usize> {
        self.timeline().hit_test(&self.schedule, pos)?;
        self.interrupt().await;

        let index = self.edit.pointer_down(&mut self.schedule, pos, button)?;
        match button {
            Button::Primary => self.select(index).await,
            Button::Secondary => self.deleted(index),
        }
        Some(index)
    }

    pub fn pointer_move(&mut self, pos: Point) -> bool {
        let moved = self.edit.pointer_move(&mut self.schedule, pos);
        self.dirty |= moved;
        moved
    }

    pub fn pointer_up(&mut self) -> bool {
        let moved = self.edit.pointer_up(&mut self.schedule);
        self.dirty |= moved;
        moved
    }

    /// Inserts a keyframe under the pointer, or ends a drag in progress.
    pub async fn click(&mut self, pos: Point) -> Option<usize> {
        if self.edit.drag().is_some() {
            self.pointer_up();
            return None;
        }
        let timeline = *self.timeline();
        self.insert_at(timeline.time_at(pos.x), timeline.intensity_at(pos.y))
            .await
    }

    pub async fn insert_at(&mut self, time: TimeOfDay, intensity: u8) -> Option<usize> {
        self.interrupt().await;
        let index = self.edit.insert_at(&mut self.schedule, time, intensity)?;
        self.dirty = true;
        self.select(index).await;
        Some(index)
    }

    pub async fn delete_at(&mut self, index: usize) -> Option<Keyframe> {
        self.interrupt().await;
        let keyframe = self.edit.delete_at(&mut self.schedule, index)?;
        self.deleted(index);
        Some(keyframe)
    }

    /// Selects a keyframe. In Live mode the device is shown the selection.
    pub async fn select(&mut self, index: usize) {
        let Some(keyframe) = self.schedule.get(index).cloned() else {
            self.reject(ScheduleError::InvalidIndex {
                index,
                len: self.schedule.len(),
            });
            return;
        };
        self.selected = Some(index);
        self.observer.notify(Notice::Selected {
            index,
            keyframe: keyframe.clone(),
        });
        if self.mode() == Mode::Live {
            self.lane.send(keyframe, true);
        }
    }

    /// Changes the levels of the selected keyframe. The first and last keyframes stay dark.
    pub async fn set_levels(&mut self, intensity: u8, intensities: Levels) -> bool {
        let Some(index) = self.selected else {
            debug!("Nothing selected, ignoring levels.");
            return false;
        };
        if self.mode() == Mode::Previewing {
            self.enter(Mode::Idle, None).await;
        }

        let len = self.schedule.len();
        let intensity = if index == 0 || index + 1 == len {
            0
        } else {
            intensity
        };
        if let Err(e) = self.schedule.set_levels(index, intensity, intensities) {
            self.reject(e);
            return false;
        }
        self.dirty = true;

        let Some(keyframe) = self.schedule.get(index).cloned() else {
            return false;
        };
        self.observer.notify(Notice::Updated {
            index,
            keyframe: keyframe.clone(),
        });
        if self.mode() == Mode::Live {
            self.lane.send(keyframe, true);
        }
        true
    }

    /// Turns Live mode on or off. Live can't be entered while Viewing.
    pub async fn set_live(&mut self, on: bool) {
        match (on, self.mode()) {
            (true, Mode::Live) => {}
            (true, Mode::Viewing) => info!("Viewing, not entering live mode."),
            (true, _) => {
                let state = self.live_state();
                self.enter(Mode::Live, Some(state)).await;
            }
            (false, Mode::Live) => self.enter(Mode::Idle, None).await,
            (false, _) => {}
        }
    }

    /// Holds the schedule's state at `time` on the device.
    pub async fn view_at(&mut self, time: TimeOfDay) -> Result<(), InterpolationError> {
        let state = match self.schedule.segment_at(time) {
            Some((a, b)) => interpolate::interpolate(time, a, b)?,
            None => Keyframe::dark(time),
        };
        self.view(state).await;
        Ok(())
    }

    /// Holds the given state on the device.
    pub async fn view(&mut self, state: Keyframe) {
        self.enter(Mode::Viewing, Some(state)).await;
    }

    pub async fn stop_viewing(&mut self) {
        if self.mode() == Mode::Viewing {
            self.enter(Mode::Idle, None).await;
        }
    }

    /// Starts previewing a snapshot of the schedule, replacing any running preview.
    pub async fn start_preview(&mut self) -> Result<(), ScheduleError> {
        let len = self.schedule.len();
        if len < 2 {
            let err = ScheduleError::TooFewKeyframes { len };
            self.reject(err.clone());
            return Err(err);
        }

        self.edit.cancel_drag();
        let previous = self.mode();
        // The preview takes over the device, so Live or Viewing are left without a release.
        // Their last push has to land before the first frame.
        self.lane.flush().await;
        self.previewer.start(self.schedule.clone()).await?;
        self.mode = Mode::Previewing;
        if previous != Mode::Previewing {
            self.mode_changed(Mode::Previewing);
        }
        Ok(())
    }

    /// Stops a running preview and releases the device. A preview that already played out
    /// keeps its last frame.
    pub async fn stop_preview(&mut self) {
        if self.mode() == Mode::Previewing {
            self.enter(Mode::Idle, None).await;
        } else {
            self.refresh_mode();
        }
    }

    /// Waits for a running preview to play out.
    pub async fn wait_for_preview(&mut self) {
        self.previewer.wait().await;
        self.refresh_mode();
    }

    /// Saves the schedule. It stays dirty if saving fails.
    pub async fn save(&mut self) -> Result<(), StoreError> {
        if let Err(e) = self.store.save(&self.schedule).await {
            warn!(store = %self.store, err = %e, "Unable to save schedule.");
            return Err(e);
        }
        self.dirty = false;
        self.observer.notify(Notice::Saved);
        Ok(())
    }

    /// Stops everything the session has running and waits for pending pushes.
    pub async fn close(mut self) {
        self.enter(Mode::Idle, None).await;
        self.marker.cancel.cancel();
        if let Err(e) = (&mut self.marker.join).await {
            warn!(err = %e, "Marker task failed.");
        }
        let Session { lane, .. } = self;
        lane.close().await;
    }

    /// Leaves whatever mode the session is in ahead of an edit gesture.
    async fn interrupt(&mut self) {
        self.edit.cancel_drag();
        if self.mode() != Mode::Idle {
            self.enter(Mode::Idle, None).await;
        } else {
            self.refresh_mode();
        }
    }

    /// Moves to a new mode. Any running preview is stopped first, so `push` never races a
    /// preview frame. Returning to Idle releases the device.
    async fn enter(&mut self, mode: Mode, push: Option<Keyframe>) {
        let current = self.mode();
        if self.mode == Mode::Previewing {
            self.previewer.stop().await;
        }
        match push {
            Some(state) => self.lane.send(state, true),
            None if mode == Mode::Idle && current != Mode::Idle => {
                self.lane.send(self.live_state(), false)
            }
            None => {}
        }
        let previous = std::mem::replace(&mut self.mode, mode);
        if previous != mode {
            self.mode_changed(mode);
        }
    }

    fn refresh_mode(&mut self) {
        if self.mode != self.mode() {
            self.mode = self.mode();
            self.mode_changed(self.mode);
        }
    }

    fn mode_changed(&self, mode: Mode) {
        let _enter = self.span.enter();
        info!(mode = ?mode, "Mode changed.");
        self.observer.notify(Notice::ModeChanged(mode));
    }

    /// The state pushed for the selection, or the first keyframe with nothing selected.
    fn live_state(&self) -> Keyframe {
        self.selected()
            .map(|(_, keyframe)| keyframe)
            .or_else(|| self.schedule.get(0))
            .cloned()
            .unwrap_or_else(|| Keyframe::dark(self.clock.now()))
    }

    fn deleted(&mut self, index: usize) {
        self.dirty = true;
        self.selected = match self.selected {
            Some(selected) if selected == index => None,
            Some(selected) if selected > index => Some(selected - 1),
            selected => selected,
        };
    }

    fn reject(&self, err: ScheduleError) {
        debug!(err = %err, "Refusing edit.");
        self.observer.notify(Notice::Rejected(err));
    }

    fn spawn_marker(
        clock: Arc<dyn Clock>,
        observer: Arc<dyn Observer>,
        previewing: Arc<AtomicBool>,
        refresh: Duration,
    ) -> MarkerHandles {
        let cancel = CancelHandle::new();
        let join = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(refresh);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {}
                        _ = cancel.cancelled() => return,
                    }
                    // Preview frames drive the marker while previewing.
                    if !previewing.load(Ordering::Acquire) {
                        observer.notify(Notice::MarkerMoved(clock.now()));
                    }
                }
            })
        };
        MarkerHandles { join, cancel }
    }
}

impl Drop for MarkerHandles {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
