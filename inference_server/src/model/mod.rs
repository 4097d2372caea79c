//! Recurrent regression network trained from scratch on a single series.
//!
//! ```text
//! window [T, 1] -> LSTM(H, sequences) -> LSTM(H, last) -> Dense(D) -> Dense(1)
//! ```

mod layers;
mod lstm;
mod network;
mod optimizer;

pub use layers::Dense;
pub use lstm::{Lstm, LstmTrace};
pub use network::{LstmRegressor, TrainingReport};
pub use optimizer::{Adam, Param, Trainable};
