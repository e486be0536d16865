use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use essay_evaluator_app_lib::error::{AppError, AppResult, EvaluatorErrorCode};
use essay_evaluator_app_lib::models::essay::{EssaySubmission, EssayType};
use essay_evaluator_app_lib::models::session::{EvaluatorHealthDto, SessionPhase};
use essay_evaluator_app_lib::services::evaluation_service::{
    EvaluationService, EVALUATION_FAILED_MESSAGE,
};
use essay_evaluator_app_lib::services::evaluator_client::EssayEvaluator;
use serde_json::{json, Value as JsonValue};

/// Scripted evaluator: each call pops the next response and waits for its delay.
struct ScriptedEvaluator {
    script: Mutex<VecDeque<(Duration, AppResult<JsonValue>)>>,
    seen: Mutex<Vec<(String, EssayType)>>,
}

impl ScriptedEvaluator {
    fn new(script: Vec<(Duration, AppResult<JsonValue>)>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl EssayEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, submission: &EssaySubmission) -> AppResult<JsonValue> {
        self.seen
            .lock()
            .expect("lock poisoned")
            .push((submission.text.clone(), submission.essay_type));
        let (delay, response) = self
            .script
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .expect("unexpected evaluator call");
        tokio::time::sleep(delay).await;
        response
    }

    async fn health(&self) -> AppResult<EvaluatorHealthDto> {
        Ok(EvaluatorHealthDto {
            healthy: true,
            status: "healthy".to_string(),
            base_url: "scripted".to_string(),
            latency_ms: 0,
            checked_at: Utc::now().to_rfc3339(),
        })
    }
}

fn payload(overall: f64) -> JsonValue {
    json!({
        "overall_score": overall,
        "cefr_level": "B2",
        "letter_grade": "B",
        "detailed_analysis": {
            "grammar": { "score": 0.81, "feedback": { "suggestions": [], "error_count": 0 } },
            "vocabulary": {
                "score": 0.62,
                "feedback": { "suggestions": ["Try less common synonyms"], "metrics": { "unique_words": 150 } }
            },
            "coherence": {
                "score": 0.59,
                "feedback": {
                    "suggestions": ["Link paragraphs explicitly"],
                    "analysis": { "paragraph_structure": { "total_paragraphs": 4 } }
                }
            }
        },
        "feedback": {
            "strengths": ["Strong grammatical foundation"],
            "areas_for_improvement": ["Improve paragraph structure and transitions"],
            "recommendations": []
        }
    })
}

#[tokio::test]
async fn successful_submission_renders_both_panels() {
    let evaluator = ScriptedEvaluator::new(vec![(Duration::ZERO, Ok(payload(0.72)))]);
    let service = EvaluationService::new(evaluator.clone());

    let view = service
        .submit(EssaySubmission::new("A thoughtful essay about rivers.", EssayType::Academic))
        .await
        .expect("view");

    assert_eq!(
        evaluator.seen.lock().expect("lock poisoned").as_slice(),
        &[("A thoughtful essay about rivers.".to_string(), EssayType::Academic)]
    );
    assert_eq!(
        view.score_summary.overall.ready().map(|badge| badge.value_label.as_str()),
        Some("72.0%")
    );
    assert_eq!(
        view.feedback_detail.strengths.body.ready().map(|body| body.items().len()),
        Some(1)
    );
    assert!(view.issues.is_empty());
    assert_eq!(service.status().phase, SessionPhase::Ready);
}

#[tokio::test]
async fn older_response_arriving_late_is_superseded() {
    let evaluator = ScriptedEvaluator::new(vec![
        (Duration::from_millis(200), Ok(payload(0.3))),
        (Duration::from_millis(10), Ok(payload(0.9))),
    ]);
    let service = EvaluationService::new(evaluator);

    let (first, second) = futures::join!(
        service.submit(EssaySubmission::new("First draft.", EssayType::General)),
        service.submit(EssaySubmission::new("Second draft.", EssayType::General)),
    );

    match first {
        Err(AppError::Superseded { .. }) => {}
        other => panic!("expected superseded, got {other:?}"),
    }
    let second = second.expect("latest view");

    let current = service.current_view().expect("snapshot");
    assert_eq!(current.request_id, second.request_id);
    assert_eq!(
        current.score_summary.overall.ready().map(|badge| badge.value_label.as_str()),
        Some("90.0%")
    );
    assert_eq!(service.status().phase, SessionPhase::Ready);
}

#[tokio::test]
async fn late_failure_of_replaced_request_is_superseded() {
    let evaluator = ScriptedEvaluator::new(vec![
        (
            Duration::from_millis(200),
            Err(AppError::evaluator(
                EvaluatorErrorCode::EvaluatorUnavailable,
                "connection reset",
            )),
        ),
        (Duration::from_millis(10), Ok(payload(0.66))),
    ]);
    let service = EvaluationService::new(evaluator);

    let (first, second) = futures::join!(
        service.submit(EssaySubmission::new("Draft that fails.", EssayType::General)),
        service.submit(EssaySubmission::new("Draft that succeeds.", EssayType::General)),
    );

    match first {
        Err(AppError::Superseded { .. }) => {}
        other => panic!("expected superseded, got {other:?}"),
    }
    let second = second.expect("latest view");

    let status = service.status();
    assert_eq!(status.phase, SessionPhase::Ready);
    assert!(status.error.is_none());
    assert_eq!(
        service.current_view().map(|view| view.request_id),
        Some(second.request_id)
    );
}

#[tokio::test]
async fn evaluator_failure_leaves_failed_session_without_result() {
    let evaluator = ScriptedEvaluator::new(vec![
        (Duration::ZERO, Ok(payload(0.8))),
        (
            Duration::ZERO,
            Err(AppError::evaluator(
                EvaluatorErrorCode::EvaluatorUnavailable,
                "connection refused",
            )),
        ),
    ]);
    let service = EvaluationService::new(evaluator);

    service
        .submit(EssaySubmission::new("Essay one.", EssayType::General))
        .await
        .expect("first view");

    let err = service
        .submit(EssaySubmission::new("Essay two.", EssayType::General))
        .await
        .expect_err("second should fail");
    assert_eq!(err.evaluator_code(), Some(EvaluatorErrorCode::EvaluatorUnavailable));

    let status = service.status();
    assert_eq!(status.phase, SessionPhase::Failed);
    assert_eq!(status.error.as_deref(), Some(EVALUATION_FAILED_MESSAGE));
    assert!(!status.has_result);
    assert!(service.current_view().is_none());
}

#[tokio::test]
async fn status_shows_pending_request_while_loading() {
    let evaluator = ScriptedEvaluator::new(vec![(Duration::from_millis(150), Ok(payload(0.5)))]);
    let service = Arc::new(EvaluationService::new(evaluator));

    let worker = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .submit(EssaySubmission::new("Pending essay.", EssayType::General))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(30)).await;
    let loading = service.status();
    assert_eq!(loading.phase, SessionPhase::Loading);
    assert!(loading.pending_request_id.is_some());
    assert!(!loading.has_result);

    let view = worker.await.expect("join").expect("view");
    assert_eq!(view.request_id, loading.pending_request_id);
}

#[tokio::test]
async fn reset_during_flight_discards_the_response() {
    let evaluator = ScriptedEvaluator::new(vec![(Duration::from_millis(100), Ok(payload(0.5)))]);
    let service = Arc::new(EvaluationService::new(evaluator));

    let worker = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .submit(EssaySubmission::new("Abandoned essay.", EssayType::General))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    service.reset();

    let outcome = worker.await.expect("join");
    assert!(matches!(outcome, Err(AppError::Superseded { .. })));
    assert_eq!(service.status().phase, SessionPhase::Idle);
    assert!(service.current_view().is_none());
}

#[tokio::test]
async fn current_view_is_stable_across_reads() {
    let evaluator = ScriptedEvaluator::new(vec![(Duration::ZERO, Ok(payload(0.77)))]);
    let service = EvaluationService::new(evaluator);

    let submitted = service
        .submit(EssaySubmission::new("Stable essay.", EssayType::General))
        .await
        .expect("view");

    let first = service.current_view().expect("snapshot");
    let second = service.current_view().expect("snapshot");
    assert_eq!(first, second);
    assert_eq!(first, submitted);
}

#[tokio::test]
async fn health_is_forwarded_from_evaluator() {
    let service = EvaluationService::new(ScriptedEvaluator::new(Vec::new()));
    let health = service.health().await.expect("health");
    assert!(health.healthy);
    assert_eq!(health.status, "healthy");
}
