use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::essay::EssayType;
use crate::models::evaluation::DecodedEvaluation;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// One resolved evaluation as held by the session. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    pub request_id: Uuid,
    pub essay_type: EssayType,
    pub word_count: usize,
    pub received_at: DateTime<Utc>,
    pub evaluation: DecodedEvaluation,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusDto {
    pub phase: SessionPhase,
    pub has_result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorHealthDto {
    pub healthy: bool,
    pub status: String,
    pub base_url: String,
    pub latency_ms: u128,
    pub checked_at: String,
}
