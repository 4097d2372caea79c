pub mod config;
pub mod error;
pub mod logger;
pub mod request;
pub mod validate;

pub use request::{PredictRequest, PredictResponse};
