use std::{path::PathBuf, time::Duration};

use build::{get_config_dir, get_data_dir};
use config::ConfigError;
use errors::{Report, Result, TypedResult};
use midi_core::{ControllerConfig, ControllerMap, ControllerMapError, MidiServiceConfig};
use serde::{Deserialize, Serialize};

const CONFIG: &str = include_str!("../config/base_config.toml");

pub const MIN_POLL_INTERVAL: f64 = 0.1;
pub const MAX_POLL_INTERVAL: f64 = 3600.0;

/// Accepts a scan interval in seconds within [`MIN_POLL_INTERVAL`]..=[`MAX_POLL_INTERVAL`]. Rejects NaN and infinities.
pub fn check_poll_interval(seconds: f64) -> Result<f64, String> {
    if (MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(format!("poll interval must be between {MIN_POLL_INTERVAL} and {MAX_POLL_INTERVAL} seconds, got {seconds}"))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(rename = "_data_dir")]
    pub data_dir: PathBuf,
    #[serde(rename = "_config_dir")]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default, flatten, skip_serializing)]
    pub app_config: AppConfig,
    /// Seconds between two device scans.
    pub poll_interval: f64,
    #[serde(rename = "MIDI")]
    pub midi: MidiServiceConfig,
    #[serde(default)]
    pub controllers: Vec<ControllerConfig>,
}

impl Config {
    /// Built-in configuration overlaid with `config.toml` from the config directory, when present.
    pub fn new() -> TypedResult<Self, ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        Self::from_sources(
            config::Config::builder()
                .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
                .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
                .add_source(config::File::from_str(CONFIG, config::FileFormat::Toml))
                .add_source(
                    config::File::from(config_dir.join("config.toml")).format(config::FileFormat::Toml).required(false),
                ),
        )
    }

    fn from_sources(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> TypedResult<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn controller_map(&self) -> TypedResult<ControllerMap, ControllerMapError> {
        ControllerMap::from_configs(&self.controllers)
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        let seconds = check_poll_interval(self.poll_interval).map_err(Report::msg)?;
        Ok(Duration::from_secs_f64(seconds))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn with_user_config(user_config: &str) -> TypedResult<Config, ConfigError> {
        Config::from_sources(
            config::Config::builder()
                .add_source(config::File::from_str(CONFIG, config::FileFormat::Toml))
                .add_source(config::File::from_str(user_config, config::FileFormat::Toml)),
        )
    }

    #[test]
    fn built_in_configuration_parses() {
        let config = with_user_config("").unwrap();
        assert_eq!(config.poll_interval, 2.0);
        assert_eq!(config.midi, MidiServiceConfig::default());
        assert_eq!(config.controllers.iter().map(|controller| controller.number).collect::<Vec<_>>(), vec![7, 74, 71]);
    }

    #[test]
    fn user_configuration_overrides_the_built_in_one() {
        let config = with_user_config(
            r#"
            poll_interval = 0.5

            [MIDI]
            devices = ["Launch"]

            [[controllers]]
            number = 20
            label = "depth"
            min = 0.0
            max = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_interval, 0.5);
        assert_eq!(config.midi.devices, vec!["Launch".to_string()]);
        assert_eq!(config.midi.client_name, "MIDI_MAP");
        assert_eq!(config.controllers.len(), 1);

        let controllers = config.controller_map().unwrap();
        let depth = controllers.get(20).unwrap();
        depth.set_from_controller(127);
        assert_eq!(depth.value(), 10.0);
    }

    #[test]
    fn built_in_controllers_build_a_map() {
        let controllers = with_user_config("").unwrap().controller_map().unwrap();
        assert_eq!(controllers.len(), 3);
        assert_eq!(controllers.get(7).unwrap().value(), 0.8);
        assert_eq!(controllers.get(71).unwrap().value(), 0.0);
    }

    #[test]
    fn reserved_controller_in_configuration_is_rejected() {
        let config = with_user_config(
            r#"
            [[controllers]]
            number = 64
            label = "sustain"
            min = 0.0
            max = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.controller_map().unwrap_err().into_inner(), ControllerMapError::Reserved(64));
    }

    #[test]
    fn poll_interval_is_bounded() {
        let config = with_user_config("poll_interval = 0.5").unwrap();
        assert_eq!(config.poll_interval().unwrap(), Duration::from_millis(500));

        for poll_interval in [f64::INFINITY, f64::NAN, 1e30, 0.0, -1.0] {
            let config = Config { poll_interval, ..config.clone() };
            assert!(config.poll_interval().is_err(), "{poll_interval} accepted");
        }
    }

    #[test]
    fn directories_come_from_defaults() {
        let config = Config::new().unwrap();
        assert_eq!(config.app_config.config_dir, get_config_dir());
        assert_eq!(config.app_config.data_dir, get_data_dir());
    }
}
