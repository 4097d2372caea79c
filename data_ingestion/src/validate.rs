use crate::error::IngestionError;
use log::warn;

/// Checks a close series before it reaches the scaler.
///
/// Closes must be finite and non-negative. The first offending value is
/// reported; an empty series is reported as such.
pub fn validate_prices(prices: &[f64]) -> Result<(), IngestionError> {
    if prices.is_empty() {
        warn!("Empty close series");
        return Err(IngestionError::EmptySeries);
    }

    for (index, &value) in prices.iter().enumerate() {
        if !value.is_finite() {
            warn!("Close at index {} is not finite", index);
            return Err(IngestionError::InvalidPrice { index, value });
        }

        if value < 0.0 {
            warn!("Close cannot be negative (index {})", index);
            return Err(IngestionError::InvalidPrice { index, value });
        }
    }

    Ok(())
}
