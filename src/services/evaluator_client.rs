use std::fmt::Display;
use std::str::FromStr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult, EvaluatorErrorCode};
use crate::models::essay::EssaySubmission;
use crate::models::session::EvaluatorHealthDto;
use crate::utils::redact::redact_essay_payload;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: usize = 2;

/// Remote scorer that turns essay text into a raw evaluation payload.
#[async_trait]
pub trait EssayEvaluator: Send + Sync {
    async fn evaluate(&self, submission: &EssaySubmission) -> AppResult<JsonValue>;

    async fn health(&self) -> AppResult<EvaluatorHealthDto>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    pub base_url: String,
    pub http_timeout: Duration,
    pub max_retries: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl EvaluatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("ESSAY_EVALUATOR_BASE_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            base_url,
            http_timeout: Duration::from_secs(setting_or(
                &lookup,
                "ESSAY_EVALUATOR_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            max_retries: setting_or(&lookup, "ESSAY_EVALUATOR_MAX_RETRIES", DEFAULT_MAX_RETRIES),
        }
    }

    /// Delay before each attempt: immediate first try, then 1s, 2s, 4s...
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        std::iter::once(Duration::ZERO)
            .chain((0..self.max_retries).map(|retry| Duration::from_secs(1 << retry.min(5))))
            .collect()
    }
}

fn setting_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(err) => {
            warn!(
                target: "app::config",
                key,
                value = %raw,
                error = %err,
                "ignoring unparsable evaluator setting"
            );
            default
        }
    }
}

/// `EssayEvaluator` backed by the evaluator's HTTP API.
pub struct HttpEvaluator {
    client: reqwest::Client,
    base_url: String,
    evaluate_endpoint: String,
    health_endpoint: String,
    backoff_schedule: Vec<Duration>,
}

impl HttpEvaluator {
    pub fn try_new(config: &EvaluatorConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build evaluator HTTP client: {err}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            evaluate_endpoint: format!("{base_url}/evaluate"),
            health_endpoint: format!("{base_url}/health"),
            base_url,
            backoff_schedule: config.backoff_schedule(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_evaluation(&self, submission: &EssaySubmission) -> AppResult<JsonValue> {
        let correlation_id = Uuid::new_v4().to_string();
        let request_body = serde_json::to_value(submission.request_body())?;
        let sanitized_payload = redact_essay_payload(&request_body);

        let mut last_error: Option<AppError> = None;

        for (attempt, delay) in self.backoff_schedule.iter().enumerate() {
            if !delay.is_zero() {
                sleep(*delay).await;
            }

            debug!(
                target: "app::evaluator::http",
                attempt = attempt + 1,
                correlation_id = %correlation_id,
                payload = %sanitized_payload,
                "invoking evaluator"
            );

            let start = Instant::now();
            let response = self
                .client
                .post(&self.evaluate_endpoint)
                .json(&request_body)
                .send()
                .await;

            let is_last_attempt = attempt + 1 == self.backoff_schedule.len();

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let latency_ms = start.elapsed().as_millis();
                        debug!(
                            target: "app::evaluator::http",
                            correlation_id = %correlation_id,
                            latency_ms,
                            content_length = ?resp.content_length(),
                            "evaluator responded"
                        );

                        return resp.json::<JsonValue>().await.map_err(|err| {
                            AppError::evaluator_with_details(
                                EvaluatorErrorCode::InvalidResponse,
                                "evaluator response is not valid JSON",
                                Some(correlation_id.as_str()),
                                Some(json!({ "reason": err.to_string() })),
                            )
                        });
                    }

                    let (error, retryable) = Self::map_http_error(status, correlation_id.as_str());
                    warn!(
                        target: "app::evaluator::http",
                        correlation_id = %correlation_id,
                        status = status.as_u16(),
                        retryable,
                        "evaluator returned non-success status"
                    );

                    if !retryable || is_last_attempt {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(err) => {
                    let (error, retryable) = Self::error_from_reqwest(err, correlation_id.as_str());
                    warn!(
                        target: "app::evaluator::http",
                        correlation_id = %correlation_id,
                        retryable,
                        "evaluator request failed"
                    );

                    if !retryable || is_last_attempt {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::evaluator_with_details(
                EvaluatorErrorCode::EvaluatorUnavailable,
                "evaluator request failed",
                Some(correlation_id.as_str()),
                None,
            )
        }))
    }

    fn map_http_error(status: StatusCode, correlation_id: &str) -> (AppError, bool) {
        match status {
            StatusCode::TOO_MANY_REQUESTS => (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::RateLimited,
                    "evaluator is rate limiting requests, try again shortly",
                    Some(correlation_id),
                    None,
                ),
                true,
            ),
            status if status.is_server_error() => (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::EvaluatorUnavailable,
                    format!("evaluator is temporarily unavailable (status {})", status.as_u16()),
                    Some(correlation_id),
                    None,
                ),
                true,
            ),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::InvalidRequest,
                    "evaluator rejected the essay submission",
                    Some(correlation_id),
                    Some(json!({ "status": status.as_u16() })),
                ),
                false,
            ),
            StatusCode::NOT_FOUND => (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::InvalidRequest,
                    "evaluator endpoint not found",
                    Some(correlation_id),
                    None,
                ),
                false,
            ),
            status => (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::Unknown,
                    format!("evaluator returned status {}", status.as_u16()),
                    Some(correlation_id),
                    None,
                ),
                false,
            ),
        }
    }

    fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> (AppError, bool) {
        if err.is_timeout() {
            (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::HttpTimeout,
                    "evaluator request timed out",
                    Some(correlation_id),
                    None,
                ),
                true,
            )
        } else if err.is_connect() {
            (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::EvaluatorUnavailable,
                    "could not connect to the evaluator",
                    Some(correlation_id),
                    None,
                ),
                true,
            )
        } else if let Some(status) = err.status() {
            Self::map_http_error(status, correlation_id)
        } else {
            (
                AppError::evaluator_with_details(
                    EvaluatorErrorCode::Unknown,
                    format!("evaluator request failed: {err}"),
                    Some(correlation_id),
                    None,
                ),
                false,
            )
        }
    }
}

#[async_trait]
impl EssayEvaluator for HttpEvaluator {
    async fn evaluate(&self, submission: &EssaySubmission) -> AppResult<JsonValue> {
        self.post_evaluation(submission).await
    }

    async fn health(&self) -> AppResult<EvaluatorHealthDto> {
        let correlation_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let response = self
            .client
            .get(&self.health_endpoint)
            .send()
            .await
            .map_err(|err| Self::error_from_reqwest(err, correlation_id.as_str()).0)?;

        let status = response.status();
        if !status.is_success() {
            let (error, _) = Self::map_http_error(status, correlation_id.as_str());
            warn!(
                target: "app::evaluator::http",
                correlation_id = %correlation_id,
                status = status.as_u16(),
                "evaluator health check returned non-success status"
            );
            return Err(error);
        }

        let body: JsonValue = response.json().await.map_err(|err| {
            AppError::evaluator_with_details(
                EvaluatorErrorCode::InvalidResponse,
                "evaluator health response is not valid JSON",
                Some(correlation_id.as_str()),
                Some(json!({ "reason": err.to_string() })),
            )
        })?;

        let reported = body
            .get("status")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(EvaluatorHealthDto {
            healthy: reported == "healthy",
            status: reported,
            base_url: self.base_url.clone(),
            latency_ms: start.elapsed().as_millis(),
            checked_at: Utc::now().to_rfc3339(),
        })
    }
}

pub mod testing {
    use super::*;

    /// Expose status mapping for integration tests without widening the public API surface.
    pub fn map_http_error(status: StatusCode) -> (AppError, bool) {
        HttpEvaluator::map_http_error(status, "test-correlation-id")
    }

    pub fn http_evaluator(base_url: &str, timeout: Duration, max_retries: usize) -> AppResult<HttpEvaluator> {
        HttpEvaluator::try_new(&EvaluatorConfig {
            base_url: base_url.to_string(),
            http_timeout: timeout,
            max_retries,
        })
    }
}
