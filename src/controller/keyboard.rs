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

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::Event;
use crate::{
    edit::{Button, Point},
    schedule::{Levels, CHANNELS},
};

const DOWN: &str = "down";
const MOVE: &str = "move";
const UP: &str = "up";
const CLICK: &str = "click";
const INSERT: &str = "insert";
const DELETE: &str = "delete";
const SELECT: &str = "select";
const LEVELS: &str = "levels";
const LIVE: &str = "live";
const VIEW: &str = "view";
const UNVIEW: &str = "unview";
const PREVIEW: &str = "preview";
const STOP: &str = "stop";
const SPEED: &str = "speed";
const SAVE: &str = "save";
const SHOW: &str = "show";

/// A controller that drives a session with typed commands, one per line.
pub struct Driver {}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Reads one command. Returns false once the input is exhausted.
    fn monitor_io<R, W>(
        events_tx: &Sender<Event>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(
            writer,
            "Command ({}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}, {}): ",
            DOWN, MOVE, UP, CLICK, INSERT, DELETE, SELECT, LEVELS, LIVE, VIEW, UNVIEW, PREVIEW,
            STOP, SPEED, SAVE, SHOW,
        )?;
        writer.flush()?;
        let mut input: String = String::default();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        match parse(&input) {
            Some(event) => events_tx
                .blocking_send(event)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
            None => warn!(input = input.trim(), "Unrecognized input"),
        }
        Ok(true)
    }
}

/// Parses a command line such as `insert 12:30 128` or `down 480 200 right`.
fn parse(input: &str) -> Option<Event> {
    let input = input.trim().to_lowercase();
    let mut words = input.split_whitespace();
    let command = words.next()?;
    let args: Vec<&str> = words.collect();

    let event = match (command, args.as_slice()) {
        (DOWN, [x, y]) => Event::PointerDown {
            position: point(x, y)?,
            button: Button::Primary,
        },
        (DOWN, [x, y, "right"]) => Event::PointerDown {
            position: point(x, y)?,
            button: Button::Secondary,
        },
        (MOVE, [x, y]) => Event::PointerMove {
            position: point(x, y)?,
        },
        (UP, []) => Event::PointerUp,
        (CLICK, [x, y]) => Event::Click {
            position: point(x, y)?,
        },
        (INSERT, [time, intensity]) => Event::Insert {
            time: time.parse().ok()?,
            intensity: intensity.parse().ok()?,
        },
        (DELETE, [index]) => Event::Delete {
            index: index.parse().ok()?,
        },
        (SELECT, [index]) => Event::Select {
            index: index.parse().ok()?,
        },
        (LEVELS, [intensity, channels @ ..]) if channels.len() == CHANNELS => Event::SetLevels {
            intensity: intensity.parse().ok()?,
            intensities: levels(channels)?,
        },
        (LIVE, ["on"]) => Event::Live(true),
        (LIVE, ["off"]) => Event::Live(false),
        (VIEW, []) => Event::View(None),
        (VIEW, [time]) => Event::View(Some(time.parse().ok()?)),
        (UNVIEW, []) => Event::StopViewing,
        (PREVIEW, []) => Event::Preview,
        (STOP, []) => Event::StopPreview,
        (SPEED, [minutes]) => Event::Speed(minutes.parse().ok()?),
        (SAVE, []) => Event::Save,
        (SHOW, []) => Event::Show,
        _ => return None,
    };
    Some(event)
}

fn point(x: &str, y: &str) -> Option<Point> {
    Some(Point::new(x.parse().ok()?, y.parse().ok()?))
}

fn levels(channels: &[&str]) -> Option<Levels> {
    let mut levels = [0; CHANNELS];
    for (level, channel) in levels.iter_mut().zip(channels) {
        *level = channel.parse().ok()?;
    }
    Some(levels)
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard driver");
            let _enter = span.enter();

            info!("Keyboard driver started.");

            while Self::monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}
            info!("Keyboard input closed.");
            Ok(())
        })
    }
}
