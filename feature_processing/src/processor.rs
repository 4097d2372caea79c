use crate::error::ProcessingError;
use crate::misc::{Sequences, WindowPlan};
use data_ingestion::config::WindowConfig;
use log::debug;
use ndarray::{Array1, Array3};

const LONG_HORIZON_DAYS: i64 = 90;
const MEDIUM_HORIZON_DAYS: i64 = 60;

const LONG_WINDOW: usize = 15;
const MEDIUM_WINDOW: usize = 10;
const SHORT_WINDOW: usize = 5;

// A clamped window of `len - 2` needs at least three closes to be non-empty.
const MIN_CLAMPED_REQUIRED: usize = 2;

/// Look-back length for a requested horizon.
pub fn select_timesteps(days: i64) -> usize {
    if days >= LONG_HORIZON_DAYS {
        LONG_WINDOW
    } else if days >= MEDIUM_HORIZON_DAYS {
        MEDIUM_WINDOW
    } else {
        SHORT_WINDOW
    }
}

/// Decide the window length for `available` closes, or report that there is
/// not enough data for a single training window.
pub fn plan_window(days: i64, available: usize, config: &WindowConfig) -> WindowPlan {
    let mut timesteps = select_timesteps(days);
    if config.clamp_to_series {
        timesteps = timesteps.min(available.saturating_sub(2));
    }

    if timesteps == 0 || available <= timesteps {
        debug!(
            "Not enough closes for a window: timesteps={}, available={}",
            timesteps, available
        );
        return WindowPlan::Insufficient {
            required: timesteps.max(MIN_CLAMPED_REQUIRED),
            available,
        };
    }

    WindowPlan::Train { timesteps }
}

/// Every run of `timesteps` consecutive values paired with the value that
/// follows it.
pub fn build_sequences(scaled: &[f64], timesteps: usize) -> Result<Sequences, ProcessingError> {
    check_window(scaled.len(), timesteps)?;

    let samples = scaled.len() - timesteps;
    let x = Array3::from_shape_fn((samples, timesteps, 1), |(i, t, _)| scaled[i + t]);
    let y = Array1::from_shape_fn(samples, |i| scaled[i + timesteps]);

    Ok(Sequences { x, y })
}

/// The most recent `timesteps` values shaped as a single-sample batch.
pub fn last_window(scaled: &[f64], timesteps: usize) -> Result<Array3<f64>, ProcessingError> {
    if timesteps == 0 {
        return Err(ProcessingError::ZeroWindow);
    }
    if scaled.len() < timesteps {
        return Err(ProcessingError::WindowTooLong {
            timesteps,
            available: scaled.len(),
        });
    }

    let tail = scaled[scaled.len() - timesteps..].to_vec();
    Ok(Array3::from_shape_vec((1, timesteps, 1), tail)?)
}

fn check_window(available: usize, timesteps: usize) -> Result<(), ProcessingError> {
    if timesteps == 0 {
        return Err(ProcessingError::ZeroWindow);
    }
    if available <= timesteps {
        return Err(ProcessingError::WindowTooLong {
            timesteps,
            available,
        });
    }
    Ok(())
}
