use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::core::ValidationErrors;

/// Failures a calculator can report for a single call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalculatorError {
    #[error("invalid calculator inputs: {0}")]
    Validation(ValidationErrors),

    #[error("down payment ({down_payment:.2}) cannot exceed the purchase price ({price:.2})")]
    DownPaymentExceedsPrice { down_payment: f64, price: f64 },

    #[error("calculation produced a non-finite value for {label}")]
    NonFinite { label: String },
}

impl From<ValidationErrors> for CalculatorError {
    fn from(errors: ValidationErrors) -> Self {
        CalculatorError::Validation(errors)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port number: {0}; must be between 1 and 65535")]
    InvalidPort(String),

    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid cache max-age: {0}")]
    InvalidCacheAge(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Errors surfaced by the HTTP and CLI layers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unknown {kind}: {slug}")]
    NotFound { kind: &'static str, slug: String },

    #[error(transparent)]
    Calculator(#[from] CalculatorError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<ValidationErrors>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Calculator(CalculatorError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Calculator(CalculatorError::DownPaymentExceedsPrice { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Calculator(CalculatorError::NonFinite { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn fields(&self) -> Option<ValidationErrors> {
        match self {
            ApiError::Calculator(CalculatorError::Validation(errors)) => Some(errors.clone()),
            ApiError::Calculator(err @ CalculatorError::DownPaymentExceedsPrice { .. }) => {
                let mut errors = ValidationErrors::new();
                errors.add("downPayment", err.to_string());
                Some(errors)
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "calculator failure");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = ErrorBody {
            error: match &self {
                ApiError::Calculator(CalculatorError::Validation(_)) => {
                    "Please correct the highlighted fields".to_string()
                }
                other => other.to_string(),
            },
            fields: self.fields(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_by_error_kind() {
        let mut fields = ValidationErrors::new();
        fields.add("homePrice", "too low");
        assert_eq!(
            ApiError::from(CalculatorError::Validation(fields)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(CalculatorError::DownPaymentExceedsPrice {
                down_payment: 2.0,
                price: 1.0
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound {
                kind: "calculator",
                slug: "x".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn down_payment_error_is_keyed_to_the_field() {
        let err = ApiError::from(CalculatorError::DownPaymentExceedsPrice {
            down_payment: 500_000.0,
            price: 400_000.0,
        });
        let fields = err.fields().expect("field map");
        assert!(
            fields
                .get("downPayment")
                .is_some_and(|m| m.contains("500000.00"))
        );
    }
}
