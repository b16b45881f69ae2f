use std::{env, fs, path::PathBuf};

use log::info;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid toml file: {0}")]
    TomlSyntaxError(String),
    #[error("$HOME is not defined")]
    HomeNotDefined,
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window_count: usize,
    pub target_fps: f64,
    pub min_size: u32,
    pub max_size: u32,
    pub jitter_pos: i32,
    pub jitter_size: i32,
    /// Fixed RNG seed for reproducible runs. Seeded from the OS when unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window_count: 100,
            target_fps: 60.0,
            min_size: 80,
            max_size: 220,
            jitter_pos: 8,
            jitter_size: 40,
            seed: None,
        }
    }
}

impl Config {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.window_count == 0 {
            return Err(ConfigError::Invalid("window_count must be at least 1".into()));
        }
        if self.min_size == 0 || self.min_size > self.max_size {
            return Err(ConfigError::Invalid(format!(
                "bad size range [{}, {}]",
                self.min_size, self.max_size
            )));
        }
        if self.target_fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "target_fps must be positive, got {}",
                self.target_fps
            )));
        }
        if self.jitter_pos < 0 || self.jitter_size < 0 {
            return Err(ConfigError::Invalid("jitter values must not be negative".into()));
        }
        Ok(self)
    }
}

pub fn load_config() -> Result<Config, ConfigError> {
    let home_dir = match env::var("HOME") {
        Ok(home_dir) => home_dir,
        Err(_e) => return Err(ConfigError::HomeNotDefined),
    };

    let config_path: PathBuf = [home_dir.as_str(), ".config", "xstress", "xstress.toml"]
        .iter()
        .collect();
    let config_content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(_) => {
            info!("no config at {}, using defaults", config_path.display());
            return Ok(Config::default());
        }
    };

    let config: Config =
        toml::from_str(&config_content).map_err(|e| ConfigError::TomlSyntaxError(e.to_string()))?;
    info!("config loaded !");
    config.validate()
}
