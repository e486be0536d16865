use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorErrorCode {
    HttpTimeout,
    RateLimited,
    InvalidResponse,
    InvalidRequest,
    EvaluatorUnavailable,
    Unknown,
}

impl EvaluatorErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluatorErrorCode::HttpTimeout => "HTTP_TIMEOUT",
            EvaluatorErrorCode::RateLimited => "RATE_LIMITED",
            EvaluatorErrorCode::InvalidResponse => "INVALID_RESPONSE",
            EvaluatorErrorCode::InvalidRequest => "INVALID_REQUEST",
            EvaluatorErrorCode::EvaluatorUnavailable => "EVALUATOR_UNAVAILABLE",
            EvaluatorErrorCode::Unknown => "UNKNOWN_EVALUATOR_ERROR",
        }
    }
}

impl fmt::Display for EvaluatorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("{message}")]
    Evaluator {
        code: EvaluatorErrorCode,
        message: String,
        correlation_id: Option<String>,
        details: Option<JsonValue>,
    },

    #[error("evaluation request {request_id} was superseded by a newer request")]
    Superseded { request_id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation { message }
    }

    pub fn evaluator(code: EvaluatorErrorCode, message: impl Into<String>) -> Self {
        Self::evaluator_with_details(code, message, None, None)
    }

    pub fn evaluator_with_details(
        code: EvaluatorErrorCode,
        message: impl Into<String>,
        correlation_id: Option<&str>,
        details: Option<JsonValue>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match (&correlation, &details) {
            (Some(id), Some(payload)) => {
                warn!(
                    target: "app::evaluator::error",
                    code = %code,
                    correlation_id = %id,
                    details = %payload,
                    %message
                );
            }
            (Some(id), None) => {
                warn!(
                    target: "app::evaluator::error",
                    code = %code,
                    correlation_id = %id,
                    %message
                );
            }
            (None, Some(payload)) => {
                warn!(
                    target: "app::evaluator::error",
                    code = %code,
                    details = %payload,
                    %message
                );
            }
            (None, None) => {
                warn!(target: "app::evaluator::error", code = %code, %message);
            }
        }

        AppError::Evaluator {
            code,
            message,
            correlation_id: correlation,
            details,
        }
    }

    pub fn superseded(request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        warn!(target: "app::session", %request_id, "evaluation response superseded");
        AppError::Superseded { request_id }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn evaluator_code(&self) -> Option<EvaluatorErrorCode> {
        match self {
            AppError::Evaluator { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn evaluator_correlation_id(&self) -> Option<&str> {
        match self {
            AppError::Evaluator { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }
}
