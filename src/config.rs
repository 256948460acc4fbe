use decay_looper::decay::DEFAULT_DECAY_FACTOR;
use decay_looper::looper::DEFAULT_HISTORY_CAPACITY;
use decay_looper::{DecayGrowth, LooperConfig};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub looper: LooperSettings,
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LooperSettings {
    pub linear_interval_ms: u64,
    /// Defaults to ten times the linear interval
    pub max_decay_interval_ms: Option<u64>,
    pub decay_factor: f64,
    pub history_capacity: usize,
}

impl Default for LooperSettings {
    fn default() -> Self {
        Self {
            linear_interval_ms: 100,
            max_decay_interval_ms: None,
            decay_factor: DEFAULT_DECAY_FACTOR,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl LooperSettings {
    pub fn to_looper_config(&self) -> LooperConfig {
        let mut config = LooperConfig::new(Duration::from_millis(self.linear_interval_ms))
            .with_decay_growth(DecayGrowth::proportional(self.decay_factor))
            .with_history_capacity(self.history_capacity);
        if let Some(max_ms) = self.max_decay_interval_ms {
            config = config.with_max_decay_interval(Duration::from_millis(max_ms));
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub size: usize,
    pub initial_index: i64,
    pub stop_index: i64,
    pub spin_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            size: 5,
            initial_index: 0,
            stop_index: 3,
            spin_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            looper: LooperSettings::default(),
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
