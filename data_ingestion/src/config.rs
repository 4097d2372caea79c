use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

const CONFIG_FILE: &str = "forecast.toml";
const ENV_PREFIX: &str = "FORECAST";

/// Service configuration: built-in defaults, then `forecast.toml`, then
/// `FORECAST_<SECTION>__<KEY>` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub window: WindowConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(CONFIG_FILE, environment())
    }

    pub fn load(path: &str, env: Environment) -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(env)
            .build()?;

        cfg.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

/// Shape and training schedule of the per-request network.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Width of both LSTM layers.
    pub hidden_units: usize,
    pub dense_units: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub shuffle: bool,
    /// Fixed RNG seed; training is nondeterministic when unset.
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_units: 50,
            dense_units: 25,
            epochs: 20,
            batch_size: 1,
            learning_rate: 0.001,
            shuffle: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientDataPolicy {
    /// Answer 400 naming the required minimum.
    #[default]
    Reject,
    /// Answer with the last known close.
    LastClose,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Cap the window length at `len(prices) - 2`.
    pub clamp_to_series: bool,
    pub insufficient_data: InsufficientDataPolicy,
}
