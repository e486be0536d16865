use serde_json::Value as JsonValue;
use tauri::State;
use tracing::{debug, warn};

use crate::models::essay::EssaySubmission;
use crate::models::session::{EvaluatorHealthDto, SessionStatusDto};
use crate::models::view::EvaluationView;

use super::{AppState, CommandError, CommandResult};

pub(crate) async fn evaluation_submit_impl(
    app_state: &AppState,
    submission: EssaySubmission,
) -> CommandResult<EvaluationView> {
    debug!(
        target: "app::command",
        essay_type = %submission.essay_type,
        words = submission.word_count(),
        "evaluation_submit invoked"
    );

    let service = app_state.evaluations();
    match service.submit(submission).await {
        Ok(view) => {
            debug!(
                target: "app::command",
                request_id = view.request_id.as_deref().unwrap_or("-"),
                issues = view.issues.len(),
                "evaluation_submit completed"
            );
            Ok(view)
        }
        Err(error) => {
            let correlation_id = error.evaluator_correlation_id().unwrap_or("-");
            warn!(
                target: "app::command",
                error = %error,
                correlation_id = %correlation_id,
                "evaluation_submit failed"
            );
            Err(CommandError::from(error))
        }
    }
}

pub(crate) fn evaluation_current_impl(app_state: &AppState) -> CommandResult<Option<EvaluationView>> {
    Ok(app_state.evaluations().current_view())
}

pub(crate) fn evaluation_preview_impl(
    app_state: &AppState,
    payload: JsonValue,
) -> CommandResult<EvaluationView> {
    debug!(target: "app::command", "evaluation_preview invoked");
    Ok(app_state.evaluations().preview(&payload))
}

pub(crate) fn evaluation_status_impl(app_state: &AppState) -> CommandResult<SessionStatusDto> {
    Ok(app_state.evaluations().status())
}

pub(crate) fn evaluation_reset_impl(app_state: &AppState) -> CommandResult<SessionStatusDto> {
    let service = app_state.evaluations();
    service.reset();
    Ok(service.status())
}

pub(crate) async fn evaluator_health_impl(
    app_state: &AppState,
) -> CommandResult<EvaluatorHealthDto> {
    match app_state.evaluations().health().await {
        Ok(health) => Ok(health),
        Err(error) => {
            warn!(target: "app::command", error = %error, "evaluator_health failed");
            Err(CommandError::from(error))
        }
    }
}

pub mod testing {
    use super::*;

    /// Internal helpers exposed for integration testing of command logic.
    pub async fn evaluation_submit(
        app_state: &AppState,
        submission: EssaySubmission,
    ) -> CommandResult<EvaluationView> {
        evaluation_submit_impl(app_state, submission).await
    }

    pub fn evaluation_current(app_state: &AppState) -> CommandResult<Option<EvaluationView>> {
        evaluation_current_impl(app_state)
    }

    pub fn evaluation_preview(
        app_state: &AppState,
        payload: JsonValue,
    ) -> CommandResult<EvaluationView> {
        evaluation_preview_impl(app_state, payload)
    }

    pub fn evaluation_status(app_state: &AppState) -> CommandResult<SessionStatusDto> {
        evaluation_status_impl(app_state)
    }

    pub fn evaluation_reset(app_state: &AppState) -> CommandResult<SessionStatusDto> {
        evaluation_reset_impl(app_state)
    }

    pub async fn evaluator_health(app_state: &AppState) -> CommandResult<EvaluatorHealthDto> {
        evaluator_health_impl(app_state).await
    }
}

#[tauri::command]
pub async fn evaluation_submit(
    submission: EssaySubmission,
    state: State<'_, AppState>,
) -> CommandResult<EvaluationView> {
    evaluation_submit_impl(state.inner(), submission).await
}

#[tauri::command]
pub fn evaluation_current(state: State<'_, AppState>) -> CommandResult<Option<EvaluationView>> {
    evaluation_current_impl(state.inner())
}

#[tauri::command]
pub fn evaluation_preview(
    payload: JsonValue,
    state: State<'_, AppState>,
) -> CommandResult<EvaluationView> {
    evaluation_preview_impl(state.inner(), payload)
}

#[tauri::command]
pub fn evaluation_status(state: State<'_, AppState>) -> CommandResult<SessionStatusDto> {
    evaluation_status_impl(state.inner())
}

#[tauri::command]
pub fn evaluation_reset(state: State<'_, AppState>) -> CommandResult<SessionStatusDto> {
    evaluation_reset_impl(state.inner())
}

#[tauri::command]
pub async fn evaluator_health(state: State<'_, AppState>) -> CommandResult<EvaluatorHealthDto> {
    evaluator_health_impl(state.inner()).await
}
