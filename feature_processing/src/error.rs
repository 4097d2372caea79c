use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Cannot fit a scaler on an empty series")]
    EmptySeries,

    #[error("Scaler used before fit")]
    NotFitted,

    #[error("Window of {timesteps} needs more than {timesteps} values, got {available}")]
    WindowTooLong { timesteps: usize, available: usize },

    #[error("Window length must be positive")]
    ZeroWindow,

    #[error("Array shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),
}
