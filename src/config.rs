use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::board::{BoardSettings, DEFAULT_LOCK_TIME_MS, DEFAULT_REFRESH_INTERVAL_MS};
use crate::error::{Error, Result};
use crate::tokenizer::Separators;

pub const DEFAULT_TICK_RATE_MS: u64 = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub lock_time_ms: u64,
    pub refresh_interval_ms: u64,
    /// How often the terminal loop wakes up without input.
    pub tick_rate_ms: u64,
    pub separators: String,
    /// Sentence file to practise instead of the built-in list.
    pub sentences: Option<PathBuf>,
    pub shuffle: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_time_ms: DEFAULT_LOCK_TIME_MS,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            separators: " ".to_string(),
            sentences: None,
            shuffle: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate_ms == 0 {
            return Err(Error::invalid_config("tick rate must be positive"));
        }
        self.board_settings()?.validate()
    }

    pub fn board_settings(&self) -> Result<BoardSettings> {
        let settings = BoardSettings {
            lock_time: Duration::from_millis(self.lock_time_ms),
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            separators: Separators::new(self.separators.chars())?,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "hardtype") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("hardtype_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing files give the defaults; unreadable or invalid ones are logged
    /// and replaced by the defaults.
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "invalid config, using defaults");
                    Config::default()
                }
            },
            Err(err) => {
                warn!(path = %self.path.display(), %err, "malformed config, using defaults");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
