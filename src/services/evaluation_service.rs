use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::essay::EssaySubmission;
use crate::models::evaluation::DecodedEvaluation;
use crate::models::session::{EvaluationRecord, EvaluatorHealthDto, SessionStatusDto};
use crate::models::view::{EvaluationView, SectionError};
use crate::services::evaluation_session::EvaluationSession;
use crate::services::evaluator_client::EssayEvaluator;
use crate::services::feedback_detail::render_feedback_detail;
use crate::services::score_summary::render_score_summary;

pub const EVALUATION_FAILED_MESSAGE: &str = "Failed to evaluate essay. Please try again.";

/// Coordinates one evaluator round-trip per submission and keeps the session
/// pointed at the newest resolved snapshot.
pub struct EvaluationService {
    evaluator: Arc<dyn EssayEvaluator>,
    session: EvaluationSession,
}

impl EvaluationService {
    pub fn new(evaluator: Arc<dyn EssayEvaluator>) -> Self {
        Self {
            evaluator,
            session: EvaluationSession::new(),
        }
    }

    pub async fn submit(&self, submission: EssaySubmission) -> AppResult<EvaluationView> {
        if submission.is_blank() {
            return Err(AppError::validation("essay text must not be empty"));
        }

        let word_count = submission.word_count();
        let ticket = self.session.begin();
        debug!(
            target: "app::evaluator",
            request_id = %ticket.request_id(),
            essay_type = %submission.essay_type,
            word_count,
            "submitting essay for evaluation"
        );

        let payload = match self.evaluator.evaluate(&submission).await {
            Ok(payload) => payload,
            Err(error) => {
                warn!(
                    target: "app::evaluator",
                    request_id = %ticket.request_id(),
                    error = %error,
                    "evaluation failed"
                );
                if !self.session.fail(&ticket, EVALUATION_FAILED_MESSAGE) {
                    return Err(AppError::superseded(ticket.request_id().to_string()));
                }
                return Err(error);
            }
        };

        let record = EvaluationRecord {
            request_id: ticket.request_id(),
            essay_type: submission.essay_type,
            word_count,
            received_at: Utc::now(),
            evaluation: DecodedEvaluation::from_value(&payload),
        };
        log_decode_issues(&record);

        let view = render_record(&record);
        if !self.session.complete(&ticket, record) {
            return Err(AppError::superseded(ticket.request_id().to_string()));
        }

        info!(
            target: "app::evaluator",
            request_id = %ticket.request_id(),
            issues = view.issues.len(),
            "evaluation rendered"
        );
        Ok(view)
    }

    /// Re-renders the current snapshot, if any.
    pub fn current_view(&self) -> Option<EvaluationView> {
        self.session.current().map(|record| render_record(&record))
    }

    /// Renders an arbitrary payload without touching the session.
    pub fn preview(&self, payload: &JsonValue) -> EvaluationView {
        render_evaluation(&DecodedEvaluation::from_value(payload))
    }

    pub fn status(&self) -> SessionStatusDto {
        self.session.status()
    }

    pub fn reset(&self) {
        self.session.reset();
    }

    pub async fn health(&self) -> AppResult<EvaluatorHealthDto> {
        self.evaluator.health().await
    }
}

/// Renders both result panels from one decoded snapshot.
pub fn render_evaluation(evaluation: &DecodedEvaluation) -> EvaluationView {
    EvaluationView {
        request_id: None,
        received_at: None,
        score_summary: render_score_summary(evaluation),
        feedback_detail: render_feedback_detail(evaluation),
        issues: evaluation.errors().into_iter().map(SectionError::from).collect(),
    }
}

fn render_record(record: &EvaluationRecord) -> EvaluationView {
    EvaluationView {
        request_id: Some(record.request_id.to_string()),
        received_at: Some(record.received_at.to_rfc3339()),
        ..render_evaluation(&record.evaluation)
    }
}

fn log_decode_issues(record: &EvaluationRecord) {
    for issue in record.evaluation.errors() {
        warn!(
            target: "app::payload",
            request_id = %record.request_id,
            path = issue.path(),
            code = issue.code(),
            reason = %issue.kind(),
            "evaluation payload section could not be decoded"
        );
    }
}
