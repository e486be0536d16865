pub mod evaluation;

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::services::evaluation_service::EvaluationService;
use crate::services::evaluator_client::{EssayEvaluator, EvaluatorConfig, HttpEvaluator};

#[derive(Clone)]
pub struct AppState {
    evaluation_service: Arc<EvaluationService>,
}

impl AppState {
    pub fn new(config: EvaluatorConfig) -> AppResult<Self> {
        let evaluator = HttpEvaluator::try_new(&config)?;
        Ok(Self::with_evaluator(Arc::new(evaluator)))
    }

    pub fn with_evaluator(evaluator: Arc<dyn EssayEvaluator>) -> Self {
        Self {
            evaluation_service: Arc::new(EvaluationService::new(evaluator)),
        }
    }

    pub fn evaluations(&self) -> Arc<EvaluationService> {
        Arc::clone(&self.evaluation_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation { message } => {
                CommandError::new("VALIDATION_ERROR", message, None)
            }
            AppError::Evaluator {
                code,
                message,
                correlation_id,
                details,
            } => {
                let mut merged = JsonMap::new();
                if let Some(existing) = details {
                    match existing {
                        JsonValue::Object(map) => {
                            for (key, value) in map {
                                merged.insert(key, value);
                            }
                        }
                        value => {
                            merged.insert("info".to_string(), value);
                        }
                    }
                }
                if let Some(id) = correlation_id {
                    merged.insert("correlationId".to_string(), JsonValue::String(id));
                }
                let detail_value = if merged.is_empty() {
                    None
                } else {
                    Some(JsonValue::Object(merged))
                };
                CommandError::new(code.as_str(), message, detail_value)
            }
            AppError::Superseded { request_id } => CommandError::new(
                "SUPERSEDED",
                "a newer evaluation request replaced this one",
                Some(serde_json::json!({ "requestId": request_id })),
            ),
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
