use serde::{Deserialize, Serialize};

/// Body of `POST /predict`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub symbol: String,
    /// Horizon hint, only used to pick the window length.
    pub days: i64,
    /// Chronological closing prices.
    #[serde(rename = "closePrices")]
    pub close_prices: Vec<f64>,
}

impl PredictRequest {
    pub fn last_close(&self) -> Option<f64> {
        self.close_prices.last().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub symbol: String,
    pub predicted_next_close: f64,
}
