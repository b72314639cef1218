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

use std::error::Error;
#[cfg(feature = "simulator")]
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aquamon::clock::{Clock, SystemClock};
use aquamon::config::init_session;
use aquamon::controller::{keyboard, Controller};
use aquamon::edit::{EditController, Timeline};
use aquamon::observer::LogObserver;
use aquamon::schedule::{Schedule, TimeOfDay};
use aquamon::store::{file, ScheduleStore};
use clap::{crate_version, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "An aquarium lighting schedule editor."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Loads, verifies and prints a schedule file.
    Schedule {
        /// The path to the schedule (YAML or JSON).
        path: PathBuf,
    },
    /// Prints the channel output a schedule produces at a time of day.
    State {
        /// The path to the schedule.
        path: PathBuf,
        /// The time of day as HH:MM. Defaults to now.
        #[arg[short, long]]
        at: Option<String>,
    },
    /// Inserts a keyframe into a schedule file.
    Insert {
        /// The path to the schedule.
        path: PathBuf,
        /// The time of day as HH:MM.
        time: String,
        /// The master intensity, 0-255.
        intensity: u8,
    },
    /// Deletes a keyframe from a schedule file.
    Delete {
        /// The path to the schedule.
        path: PathBuf,
        /// The index of the keyframe to delete.
        index: usize,
    },
    /// Plays the configured schedule through the configured device.
    Preview {
        /// The path to the dashboard config.
        config_path: PathBuf,
    },
    /// Starts an interactive dashboard session driven from the keyboard.
    Dashboard {
        /// The path to the dashboard config.
        config_path: PathBuf,
    },
    /// Runs a simulated lighting controller.
    #[cfg(feature = "simulator")]
    Simulator {
        /// The address to listen on.
        #[arg[short, long, default_value = "127.0.0.1:8080"]]
        bind: SocketAddr,
        /// A schedule file to start with.
        #[arg[short, long]]
        schedule: Option<PathBuf>,
    },
}

fn print_schedule(schedule: &Schedule) {
    println!("Schedule (keyframes: {}):", schedule.len());
    for (index, keyframe) in schedule.iter().enumerate() {
        println!(
            "{:>3}. {} intensity {:>3} channels {:?}",
            index, keyframe.start_time, keyframe.intensity, keyframe.intensities
        );
    }
}

/// Applies an edit to a schedule file through the edit controller and saves it.
async fn edit_file<F>(path: &Path, edit: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut EditController, &mut Schedule) -> bool,
{
    let store = file::Store::new(path)?;
    let mut schedule = store.load().await?;
    let mut controller = EditController::new(Timeline::default(), Arc::new(LogObserver {}));
    if !edit(&mut controller, &mut schedule) {
        return Err("edit was rejected".into());
    }
    store.save(&schedule).await?;
    print_schedule(&schedule);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule { path } => {
            let schedule = file::Store::new(&path)?.load().await?;
            print_schedule(&schedule);
        }
        Commands::State { path, at } => {
            let schedule = file::Store::new(&path)?.load().await?;
            let time = match at {
                Some(at) => at.parse::<TimeOfDay>()?,
                None => SystemClock {}.now(),
            };
            println!("{}: {:?}", time, schedule.output_at(time)?);
        }
        Commands::Insert {
            path,
            time,
            intensity,
        } => {
            let time: TimeOfDay = time.parse()?;
            edit_file(&path, |controller, schedule| {
                controller.insert_at(schedule, time, intensity).is_some()
            })
            .await?;
        }
        Commands::Delete { path, index } => {
            edit_file(&path, |controller, schedule| {
                controller.delete_at(schedule, index).is_some()
            })
            .await?;
        }
        Commands::Preview { config_path } => {
            let mut session = init_session(&config_path, Arc::new(LogObserver {})).await?;
            session.start_preview().await?;
            session.wait_for_preview().await;
            session.close().await;
        }
        Commands::Dashboard { config_path } => {
            let session = init_session(&config_path, Arc::new(LogObserver {})).await?;
            Controller::new(session, Arc::new(keyboard::Driver::new()))
                .join()
                .await?;
        }
        #[cfg(feature = "simulator")]
        Commands::Simulator { bind, schedule } => {
            let schedule = match schedule {
                Some(path) => file::Store::new(&path)?.load().await?,
                None => Schedule::default(),
            };
            aquamon::simulator::serve(
                bind,
                aquamon::simulator::State::new(schedule, Arc::new(SystemClock {})),
            )
            .await?;
        }
    }

    Ok(())
}
