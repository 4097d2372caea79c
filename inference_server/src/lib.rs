pub mod engine;
pub mod error;
pub mod misc;
pub mod model;
pub mod server;

pub use engine::{Forecast, ForecastSource, InferenceEngine};
pub use error::{ApiError, EngineError, ModelError};
