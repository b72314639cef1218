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

use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{error, info, span, Instrument, Level};

use crate::edit::{Button, Point};
use crate::schedule::{Levels, TimeOfDay};
use crate::session::Session;

pub mod keyboard;

/// Dashboard input that drives the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A button was pressed on the timeline.
    PointerDown { position: Point, button: Button },

    /// The pointer moved over the timeline.
    PointerMove { position: Point },

    /// The button was released.
    PointerUp,

    /// A click on the timeline. Inserts a keyframe unless a drag is in progress.
    Click { position: Point },

    /// Inserts a keyframe at the given time.
    Insert { time: TimeOfDay, intensity: u8 },

    /// Deletes the keyframe at the given index.
    Delete { index: usize },

    /// Selects the keyframe at the given index.
    Select { index: usize },

    /// Changes the levels of the selected keyframe.
    SetLevels { intensity: u8, intensities: Levels },

    /// Turns live mode on or off.
    Live(bool),

    /// Holds a state on the device. With no time, the selected keyframe is shown.
    View(Option<TimeOfDay>),

    /// Stops holding a state on the device.
    StopViewing,

    /// Starts previewing the schedule.
    Preview,

    /// Stops the running preview.
    StopPreview,

    /// Sets the preview speed in minutes per tick.
    Speed(u32),

    /// Saves the schedule.
    Save,

    /// Logs the schedule.
    Show,
}

pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>>;
}

/// Controls a dashboard session.
pub struct Controller {
    handle: JoinHandle<()>,
}

impl Controller {
    /// Creates a new controller with the given driver.
    pub fn new(session: Session, driver: Arc<dyn Driver>) -> Controller {
        let span = span!(Level::INFO, "controller");
        Controller {
            handle: tokio::spawn(Controller::trigger_events(session, driver).instrument(span)),
        }
    }

    /// Join will block until the controller finishes.
    pub async fn join(&mut self) -> Result<(), JoinError> {
        (&mut self.handle).await
    }

    /// Triggers session events by watching the driver and getting events from it.
    async fn trigger_events(mut session: Session, driver: Arc<dyn Driver>) {
        let (events_tx, mut events_rx) = mpsc::channel(1);
        let join_handle = driver.monitor_events(events_tx);

        info!(
            keyframes = session.schedule().len(),
            "Controller started."
        );

        while let Some(event) = events_rx.recv().await {
            info!(event = ?event, "Received event.");
            Controller::handle(&mut session, event).await;
        }

        info!("Controller closing.");
        if let Err(e) = join_handle.await {
            error!("Error waiting for event monitor to stop: {}", e);
        }
        if session.is_dirty() {
            info!("Closing with unsaved changes.");
        }
        session.close().await;
    }

    async fn handle(session: &mut Session, event: Event) {
        match event {
            Event::PointerDown { position, button } => {
                session.pointer_down(position, button).await;
            }
            Event::PointerMove { position } => {
                session.pointer_move(position);
            }
            Event::PointerUp => {
                session.pointer_up();
            }
            Event::Click { position } => {
                session.click(position).await;
            }
            Event::Insert { time, intensity } => {
                session.insert_at(time, intensity).await;
            }
            Event::Delete { index } => {
                session.delete_at(index).await;
            }
            Event::Select { index } => session.select(index).await,
            Event::SetLevels {
                intensity,
                intensities,
            } => {
                session.set_levels(intensity, intensities).await;
            }
            Event::Live(on) => session.set_live(on).await,
            Event::View(Some(time)) => {
                if let Err(e) = session.view_at(time).await {
                    error!(err = %e, "Unable to view state.");
                }
            }
            Event::View(None) => {
                let selected = session.selected().map(|(_, keyframe)| keyframe.clone());
                match selected {
                    Some(keyframe) => session.view(keyframe).await,
                    None => info!("Nothing selected to view."),
                }
            }
            Event::StopViewing => session.stop_viewing().await,
            Event::Preview => {
                if let Err(e) = session.start_preview().await {
                    error!(err = %e, "Unable to preview.");
                }
            }
            Event::StopPreview => session.stop_preview().await,
            Event::Speed(minutes) => session.speed().set(minutes),
            Event::Save => {
                if let Err(e) = session.save().await {
                    error!(err = %e, "Unable to save schedule.");
                }
            }
            Event::Show => {
                for (index, keyframe) in session.schedule().iter().enumerate() {
                    info!(
                        index,
                        time = %keyframe.start_time,
                        intensity = keyframe.intensity,
                        channels = ?keyframe.intensities,
                        "Keyframe."
                    );
                }
            }
        }
    }
}
