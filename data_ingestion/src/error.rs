use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("closePrices must not be empty")]
    EmptySeries,

    #[error("Invalid close price at index {index}: {value}")]
    InvalidPrice { index: usize, value: f64 },
}
