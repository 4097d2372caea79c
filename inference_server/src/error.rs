use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use data_ingestion::error::IngestionError;
use feature_processing::ProcessingError;
use log::error;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("No training samples")]
    NoSamples,

    #[error("Window length must be positive")]
    EmptyWindow,

    #[error("Expected {expected} input features per timestep, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("{samples} windows but {targets} targets")]
    TargetMismatch { samples: usize, targets: usize },

    #[error("Training diverged at epoch {epoch}: loss is not finite")]
    Diverged { epoch: usize },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Not enough data for prediction. Need more than {required} days, but got {available}.")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] IngestionError),

    #[error("Preprocessing failed: {0}")]
    Processing(#[from] ProcessingError),

    #[error("Model failed: {0}")]
    Model(#[from] ModelError),

    #[error("Model produced a non-finite prediction")]
    NonFinitePrediction,
}

impl EngineError {
    /// Whether the caller, not the service, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::InsufficientData { .. } | EngineError::InvalidInput(_)
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error payloads returned by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 400 `{error}`
    #[error("{0}")]
    BadRequest(String),

    /// Malformed body; keeps the extractor's status.
    #[error("{message}")]
    Validation { status: StatusCode, message: String },

    /// 500 `{error, trace}`
    #[error("{0}")]
    Internal(anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(anyhow::Error::new(err))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Validation { status, message } => {
                (status, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(err) => {
                let trace = format!("{:?}", err);
                error!("Forecast failed: {}", trace);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": err.to_string(), "trace": trace })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = EngineError::InsufficientData {
            required: 15,
            available: 12,
        };

        assert_eq!(
            err.to_string(),
            "Not enough data for prediction. Need more than 15 days, but got 12."
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_status_mapping() {
        let bad = ApiError::from(EngineError::InsufficientData {
            required: 5,
            available: 1,
        });
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let invalid = ApiError::from(EngineError::from(IngestionError::EmptySeries));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = ApiError::from(EngineError::Model(ModelError::Diverged { epoch: 3 }));
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let validation = ApiError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "missing field `days`".to_string(),
        };
        assert_eq!(
            validation.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
