pub mod error;
pub mod misc;
pub mod processor;
pub mod scaler;

pub use error::ProcessingError;
pub use misc::{Sequences, WindowPlan};
pub use processor::{build_sequences, last_window, plan_window, select_timesteps};
pub use scaler::MinMaxScaler;
