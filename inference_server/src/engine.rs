use crate::error::EngineError;
use crate::model::LstmRegressor;
use data_ingestion::PredictRequest;
use data_ingestion::config::{AppConfig, InsufficientDataPolicy, ModelConfig, WindowConfig};
use data_ingestion::validate::validate_prices;
use feature_processing::{MinMaxScaler, WindowPlan, build_sequences, last_window, plan_window};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastSource {
    Model,
    /// Too few closes; the last close is echoed back.
    LastClose,
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub value: f64,
    pub timesteps: usize,
    pub source: ForecastSource,
    pub final_loss: Option<f64>,
}

/// Scale -> window -> train -> predict -> unscale, one request at a time.
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    model: ModelConfig,
    window: WindowConfig,
}

impl InferenceEngine {
    pub fn new(model: ModelConfig, window: WindowConfig) -> Self {
        Self { model, window }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.model.clone(), config.window.clone())
    }

    pub fn forecast(&self, request: &PredictRequest) -> Result<Forecast, EngineError> {
        let prices = &request.close_prices;
        validate_prices(prices)?;

        let timesteps = match plan_window(request.days, prices.len(), &self.window) {
            WindowPlan::Train { timesteps } => timesteps,
            WindowPlan::Insufficient {
                required,
                available,
            } => return self.insufficient(request, required, available),
        };

        let started = Instant::now();

        let mut scaler = MinMaxScaler::new();
        let scaled = scaler.fit_transform(prices)?;
        let sequences = build_sequences(&scaled, timesteps)?;

        let mut rng = self.rng();
        let mut model = LstmRegressor::new(&self.model, &mut rng);
        let report = model.fit(&sequences.x, &sequences.y, &mut rng)?;

        let window = last_window(&scaled, timesteps)?;
        let predicted_scaled = model.predict(&window)?[0];
        let value = scaler.inverse_transform_value(predicted_scaled)?;

        if !value.is_finite() {
            return Err(EngineError::NonFinitePrediction);
        }

        info!(
            "{}: trained on {} windows of {} in {:?}, loss={:.6}, next close={:.4}",
            request.symbol,
            report.samples,
            timesteps,
            started.elapsed(),
            report.final_loss().unwrap_or(f64::NAN),
            value
        );

        Ok(Forecast {
            value,
            timesteps,
            source: ForecastSource::Model,
            final_loss: report.final_loss(),
        })
    }

    fn insufficient(
        &self,
        request: &PredictRequest,
        required: usize,
        available: usize,
    ) -> Result<Forecast, EngineError> {
        let last_close = match (self.window.insufficient_data, request.last_close()) {
            (InsufficientDataPolicy::LastClose, Some(last_close)) => last_close,
            _ => {
                return Err(EngineError::InsufficientData {
                    required,
                    available,
                });
            }
        };

        warn!(
            "{}: {} closes is not enough for a window of {}, returning last close",
            request.symbol, available, required
        );
        Ok(Forecast {
            value: last_close,
            timesteps: required,
            source: ForecastSource::LastClose,
            final_loss: None,
        })
    }

    fn rng(&self) -> StdRng {
        match self.model.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> ModelConfig {
        ModelConfig {
            hidden_units: 4,
            dense_units: 3,
            epochs: 2,
            batch_size: 1,
            learning_rate: 0.01,
            shuffle: true,
            seed: Some(17),
        }
    }

    fn request(days: i64, close_prices: Vec<f64>) -> PredictRequest {
        PredictRequest {
            symbol: "TEST".to_string(),
            days,
            close_prices,
        }
    }

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.2).collect()
    }

    #[test]
    fn test_forecast_is_finite() {
        let engine = InferenceEngine::new(small_model(), WindowConfig::default());
        let prices = closes(20);

        let forecast = engine.forecast(&request(30, prices.clone())).unwrap();

        assert_eq!(forecast.source, ForecastSource::Model);
        assert_eq!(forecast.timesteps, 5);
        assert!(forecast.value.is_finite());
        assert!(forecast.final_loss.is_some());

        // Loose bound: the linear head is unbounded, a two-epoch model is not accurate.
        assert!(forecast.value > 0.0 && forecast.value < 250.0);
    }

    #[test]
    fn test_reject_policy() {
        let engine = InferenceEngine::new(small_model(), WindowConfig::default());

        let err = engine.forecast(&request(95, closes(15))).unwrap_err();

        assert!(matches!(
            err,
            EngineError::InsufficientData { required: 15, available: 15 }
        ));
        assert!(err.to_string().contains("Need more than 15 days"));
    }

    #[test]
    fn test_last_close_policy() {
        let window = WindowConfig {
            clamp_to_series: true,
            insufficient_data: InsufficientDataPolicy::LastClose,
        };
        let engine = InferenceEngine::new(small_model(), window);

        let forecast = engine.forecast(&request(30, vec![101.0, 103.5])).unwrap();

        assert_eq!(forecast.source, ForecastSource::LastClose);
        assert_eq!(forecast.value, 103.5);
        assert!(forecast.final_loss.is_none());
    }

    #[test]
    fn test_clamped_reject_reports_minimum() {
        let window = WindowConfig {
            clamp_to_series: true,
            insufficient_data: InsufficientDataPolicy::Reject,
        };
        let engine = InferenceEngine::new(small_model(), window);

        let err = engine.forecast(&request(30, vec![101.0, 103.5])).unwrap_err();

        assert!(matches!(
            err,
            EngineError::InsufficientData { required: 2, available: 2 }
        ));
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Need more than 2 days, but got 2."));
    }

    #[test]
    fn test_clamped_window_trains_on_short_series() {
        let window = WindowConfig {
            clamp_to_series: true,
            insufficient_data: InsufficientDataPolicy::LastClose,
        };
        let engine = InferenceEngine::new(small_model(), window);

        let forecast = engine.forecast(&request(95, closes(8))).unwrap();

        assert_eq!(forecast.source, ForecastSource::Model);
        assert_eq!(forecast.timesteps, 6);
        assert!(forecast.value.is_finite());
    }

    #[test]
    fn test_empty_series_is_rejected_under_both_policies() {
        for policy in [InsufficientDataPolicy::Reject, InsufficientDataPolicy::LastClose] {
            let window = WindowConfig {
                clamp_to_series: false,
                insufficient_data: policy,
            };
            let engine = InferenceEngine::new(small_model(), window);

            let err = engine.forecast(&request(30, vec![])).unwrap_err();
            assert!(err.is_client_error());
        }
    }

    #[test]
    fn test_negative_price_is_client_error() {
        let engine = InferenceEngine::new(small_model(), WindowConfig::default());
        let mut prices = closes(10);
        prices[3] = -4.0;

        let err = engine.forecast(&request(30, prices)).unwrap_err();

        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_constant_series() {
        let engine = InferenceEngine::new(small_model(), WindowConfig::default());

        let forecast = engine.forecast(&request(30, vec![50.0; 12])).unwrap();

        assert!(forecast.value.is_finite());
    }
}
