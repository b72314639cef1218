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
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::info;

use crate::clock::SystemClock;
use crate::gateway::{self, http};
use crate::observer::Observer;
use crate::schedule::Schedule;
use crate::session::{Session, Settings};
use crate::store::{self, ScheduleStore};

mod error;
mod playback;
mod timeline;

pub use error::ConfigError;
pub use playback::Playback;
pub use timeline::Timeline;

pub const DEFAULT_DEVICE: &str = "log";
pub const DEFAULT_MARKER_REFRESH: Duration = Duration::from_secs(60);
const ENV_PREFIX: &str = "AQUAMON";

/// The dashboard configuration.
#[derive(Deserialize, Clone, Default)]
pub struct Dashboard {
    /// The device base URL, or `mock` or `log`.
    device: Option<String>,

    /// A local schedule file to use instead of the device's stored schedule.
    schedule_file: Option<PathBuf>,

    playback: Option<Playback>,

    timeline: Option<Timeline>,

    /// How often the now marker is refreshed.
    marker_refresh: Option<String>,
}

impl Dashboard {
    /// Parse a dashboard configuration from a YAML file, overlaid with `AQUAMON_` variables
    /// from the environment.
    pub fn deserialize(path: &Path) -> Result<Dashboard, ConfigError> {
        Dashboard::build(Config::builder().add_source(File::from(path)))
    }

    /// Parse a dashboard configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Dashboard, ConfigError> {
        Dashboard::build(Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Dashboard, ConfigError> {
        Ok(builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Dashboard>()?)
    }

    pub fn device(&self) -> &str {
        self.device.as_deref().unwrap_or(DEFAULT_DEVICE)
    }

    pub fn schedule_file(&self) -> Option<&Path> {
        self.schedule_file.as_deref()
    }

    pub fn playback(&self) -> Playback {
        self.playback.clone().unwrap_or_default()
    }

    pub fn marker_refresh(&self) -> Result<Duration, ConfigError> {
        playback::parse_duration(&self.marker_refresh, DEFAULT_MARKER_REFRESH)
    }

    /// The session settings this configuration describes.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let playback = self.playback();
        Ok(Settings {
            timeline: self.timeline.clone().unwrap_or_default().to_timeline()?,
            tick: playback.tick()?,
            speed: playback.speed()?,
            push_timeout: playback.push_timeout()?,
            marker_refresh: self.marker_refresh()?,
        })
    }

    /// Picks where the schedule is kept. A schedule file wins, then an HTTP device. Devices
    /// without storage get an in-memory default schedule.
    pub fn store(&self, push_timeout: Duration) -> Result<Arc<dyn ScheduleStore>, Box<dyn Error>> {
        if let Some(path) = self.schedule_file() {
            return Ok(Arc::new(store::file::Store::new(path)?));
        }
        let device = self.device();
        if device.starts_with("mock") || device == DEFAULT_DEVICE {
            return Ok(Arc::new(store::memory::Store::new(Schedule::default())));
        }
        Ok(Arc::new(http::Device::new(device, push_timeout)?))
    }
}

/// Opens a session from the given config file.
pub async fn init_session(
    path: &Path,
    observer: Arc<dyn Observer>,
) -> Result<Session, Box<dyn Error>> {
    let config = Dashboard::deserialize(path)?;
    let settings = config.settings()?;
    let gateway = gateway::get_gateway(config.device(), settings.push_timeout)?;
    let store = config.store(settings.push_timeout)?;
    info!(gateway = %gateway, store = %store, "Opening session.");

    Ok(Session::load(gateway, store, Arc::new(SystemClock {}), observer, settings).await?)
}

#[cfg(test)]
mod test {
    use std::{env, time::Duration};

    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_defaults() -> Result<(), ConfigError> {
        let config = Dashboard::from_yaml("{}")?;
        assert_eq!("log", config.device());
        assert_eq!(None, config.schedule_file());

        let settings = config.settings()?;
        assert_eq!(Duration::from_millis(10), settings.tick);
        assert_eq!(5, settings.speed);
        assert_eq!(Duration::from_secs(2), settings.push_timeout);
        assert_eq!(Duration::from_secs(60), settings.marker_refresh);
        assert_eq!(crate::edit::Timeline::default(), settings.timeline);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_full_config() -> Result<(), ConfigError> {
        let config = Dashboard::from_yaml(
            r#"
            device: http://aquarium.local
            schedule_file: /var/lib/aquamon/schedule.yaml
            playback:
              tick: 50ms
              speed: 15
              push_timeout: 500ms
            timeline:
              width: 1440
              height: 255
              hit_tolerance: 4
            marker_refresh: 30s
            "#,
        )?;
        assert_eq!("http://aquarium.local", config.device());
        assert_eq!(
            Some(Path::new("/var/lib/aquamon/schedule.yaml")),
            config.schedule_file()
        );

        let settings = config.settings()?;
        assert_eq!(Duration::from_millis(50), settings.tick);
        assert_eq!(15, settings.speed);
        assert_eq!(Duration::from_millis(500), settings.push_timeout);
        assert_eq!(Duration::from_secs(30), settings.marker_refresh);
        assert_eq!(
            crate::edit::Timeline::new(1440.0, 255.0, 4.0),
            settings.timeline
        );
        Ok(())
    }

    #[test]
    #[serial]
    fn test_invalid_values() -> Result<(), ConfigError> {
        let config = Dashboard::from_yaml("playback:\n  tick: soon\n")?;
        assert!(matches!(config.settings(), Err(ConfigError::Duration(_))));

        let config = Dashboard::from_yaml("playback:\n  speed: 0\n")?;
        assert!(matches!(config.settings(), Err(ConfigError::Invalid(_))));

        let config = Dashboard::from_yaml("playback:\n  speed: 4294967295\n")?;
        assert!(matches!(config.settings(), Err(ConfigError::Invalid(_))));

        let config = Dashboard::from_yaml("playback:\n  speed: 1440\n")?;
        assert_eq!(1440, config.settings()?.speed);

        let config = Dashboard::from_yaml("timeline:\n  width: -1\n")?;
        assert!(matches!(config.settings(), Err(ConfigError::Invalid(_))));
        Ok(())
    }

    #[test]
    #[serial]
    fn test_environment_overrides() -> Result<(), ConfigError> {
        env::set_var("AQUAMON_DEVICE", "mock-env");
        env::set_var("AQUAMON_PLAYBACK__SPEED", "42");
        let config = Dashboard::from_yaml("device: log\nplayback:\n  tick: 20ms\n");
        env::remove_var("AQUAMON_DEVICE");
        env::remove_var("AQUAMON_PLAYBACK__SPEED");

        let config = config?;
        assert_eq!("mock-env", config.device());
        let settings = config.settings()?;
        assert_eq!(42, settings.speed);
        assert_eq!(Duration::from_millis(20), settings.tick);
        Ok(())
    }

    #[test]
    #[serial]
    fn test_deserialize_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("aquamon.yaml");
        std::fs::write(&path, "device: mock\nmarker_refresh: 5m\n")?;

        let config = Dashboard::deserialize(&path)?;
        assert_eq!("mock", config.device());
        assert_eq!(Duration::from_secs(300), config.marker_refresh()?);
        assert!(matches!(
            Dashboard::deserialize(&dir.path().join("missing.yaml")),
            Err(ConfigError::Load(_))
        ));
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn test_init_session() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let schedule_path = dir.path().join("schedule.yaml");
        let config_path = dir.path().join("aquamon.yaml");
        std::fs::write(
            &config_path,
            format!(
                "device: mock\nschedule_file: {}\n",
                schedule_path.display()
            ),
        )?;

        let mut session =
            init_session(&config_path, Arc::new(crate::observer::LogObserver {})).await?;
        assert_eq!(Schedule::default(), *session.schedule());
        session.insert_at("12:00".parse()?, 100).await;
        session.save().await?;
        session.close().await;

        let saved = store::file::Store::new(&schedule_path)?.load().await?;
        assert_eq!(3, saved.len());
        Ok(())
    }
}
