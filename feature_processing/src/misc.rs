use ndarray::{Array1, Array3};

/// Overlapping training windows over a scaled series.
#[derive(Debug, Clone)]
pub struct Sequences {
    /// `[samples, timesteps, 1]`
    pub x: Array3<f64>,
    /// Scaled value following each window.
    pub y: Array1<f64>,
}

impl Sequences {
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn timesteps(&self) -> usize {
        self.x.shape()[1]
    }
}

/// Outcome of matching a requested horizon against the available closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPlan {
    Train { timesteps: usize },
    Insufficient { required: usize, available: usize },
}
