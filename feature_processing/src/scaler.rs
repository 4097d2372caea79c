use crate::error::ProcessingError;

/// Linear rescaling of a series into `[feature_min, feature_max]` using the
/// minimum and maximum observed at fit time.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    feature_min: f64,
    feature_max: f64,
    fitted: Option<FittedRange>,
}

#[derive(Debug, Clone, Copy)]
struct FittedRange {
    data_min: f64,
    data_max: f64,
    scale: f64,
    offset: f64,
}

impl MinMaxScaler {
    /// Scaler targeting `[0, 1]`.
    pub fn new() -> Self {
        Self::with_range(0.0, 1.0)
    }

    pub fn with_range(feature_min: f64, feature_max: f64) -> Self {
        Self {
            feature_min,
            feature_max,
            fitted: None,
        }
    }

    pub fn fit(&mut self, values: &[f64]) -> Result<&mut Self, ProcessingError> {
        if values.is_empty() {
            return Err(ProcessingError::EmptySeries);
        }

        let data_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // A flat series has no range; treat it as unit range so transform
        // maps every value to feature_min and inversion restores it.
        let mut data_range = data_max - data_min;
        if data_range == 0.0 {
            data_range = 1.0;
        }

        let scale = (self.feature_max - self.feature_min) / data_range;
        let offset = self.feature_min - data_min * scale;

        self.fitted = Some(FittedRange {
            data_min,
            data_max,
            scale,
            offset,
        });
        Ok(self)
    }

    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ProcessingError> {
        let range = self.range()?;
        Ok(values.iter().map(|v| v * range.scale + range.offset).collect())
    }

    pub fn fit_transform(&mut self, values: &[f64]) -> Result<Vec<f64>, ProcessingError> {
        self.fit(values)?;
        self.transform(values)
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, ProcessingError> {
        let range = self.range()?;
        Ok(values.iter().map(|v| (v - range.offset) / range.scale).collect())
    }

    pub fn inverse_transform_value(&self, value: f64) -> Result<f64, ProcessingError> {
        let range = self.range()?;
        Ok((value - range.offset) / range.scale)
    }

    pub fn data_min(&self) -> Option<f64> {
        self.fitted.map(|r| r.data_min)
    }

    pub fn data_max(&self) -> Option<f64> {
        self.fitted.map(|r| r.data_max)
    }

    fn range(&self) -> Result<FittedRange, ProcessingError> {
        self.fitted.ok_or(ProcessingError::NotFitted)
    }
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_scales_into_unit_range() {
        let prices = [120.0, 100.0, 150.0, 125.0];
        let scaled = MinMaxScaler::new().fit_transform(&prices).unwrap();

        assert!((scaled[0] - 0.4).abs() < EPS);
        assert!(scaled[1].abs() < EPS);
        assert!((scaled[2] - 1.0).abs() < EPS);
        assert!((scaled[3] - 0.5).abs() < EPS);
    }

    #[test]
    fn test_round_trip() {
        let prices = [187.23, 189.11, 185.64, 190.02, 191.77, 188.4, 0.5, 1e4];
        let mut scaler = MinMaxScaler::new();
        let scaled = scaler.fit_transform(&prices).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (orig, back) in prices.iter().zip(restored.iter()) {
            assert!((orig - back).abs() < 1e-9 * orig.abs().max(1.0));
        }
    }

    #[test]
    fn test_custom_range() {
        let mut scaler = MinMaxScaler::with_range(-1.0, 1.0);
        let scaled = scaler.fit_transform(&[0.0, 5.0, 10.0]).unwrap();

        assert!((scaled[0] + 1.0).abs() < EPS);
        assert!(scaled[1].abs() < EPS);
        assert!((scaled[2] - 1.0).abs() < EPS);
        assert!((scaler.inverse_transform_value(0.5).unwrap() - 7.5).abs() < EPS);
    }

    #[test]
    fn test_constant_series() {
        let mut scaler = MinMaxScaler::new();
        let scaled = scaler.fit_transform(&[42.0, 42.0, 42.0]).unwrap();

        assert!(scaled.iter().all(|v| *v == 0.0));
        assert_eq!(scaler.inverse_transform_value(0.0).unwrap(), 42.0);
        assert_eq!(scaler.data_min(), Some(42.0));
        assert_eq!(scaler.data_max(), Some(42.0));
    }

    #[test]
    fn test_errors() {
        let mut scaler = MinMaxScaler::new();
        assert!(matches!(scaler.transform(&[1.0]), Err(ProcessingError::NotFitted)));
        assert!(matches!(scaler.fit(&[]), Err(ProcessingError::EmptySeries)));
    }
}
