use essay_evaluator_app_lib::models::evaluation::{
    Category, DecodedEvaluation, EvaluationResult, PayloadErrorKind,
};
use essay_evaluator_app_lib::services::evaluation_service::render_evaluation;
use serde_json::{json, Value as JsonValue};

fn complete_payload() -> JsonValue {
    json!({
        "overall_score": 0.88,
        "cefr_level": "C1",
        "letter_grade": "A",
        "detailed_analysis": {
            "grammar": { "score": 0.9, "feedback": { "suggestions": ["Nice work"], "error_count": 0 } },
            "vocabulary": {
                "score": 0.86,
                "feedback": { "suggestions": ["Avoid repetition"], "metrics": { "unique_words": 301 } }
            },
            "coherence": {
                "score": 0.87,
                "feedback": {
                    "suggestions": ["Keep it up"],
                    "analysis": { "paragraph_structure": { "total_paragraphs": 6 } }
                }
            }
        },
        "feedback": {
            "strengths": ["Excellent grammar usage", "Rich and varied vocabulary"],
            "areas_for_improvement": [],
            "recommendations": ["Continue practicing to maintain your excellent level"]
        }
    })
}

#[test]
fn complete_payload_renders_without_issues() {
    let decoded = DecodedEvaluation::from_value(&complete_payload());
    assert!(decoded.is_complete());

    let view = render_evaluation(&decoded);
    assert!(view.issues.is_empty());
    assert!(EvaluationResult::from_value(&complete_payload()).is_ok());
}

#[test]
fn missing_vocabulary_only_breaks_vocabulary_sections() {
    let mut payload = complete_payload();
    payload["detailed_analysis"]
        .as_object_mut()
        .expect("object")
        .remove("vocabulary");

    let view = render_evaluation(&DecodedEvaluation::from_value(&payload));

    assert_eq!(view.issues.len(), 1);
    assert_eq!(view.issues[0].path, "detailed_analysis.vocabulary");
    assert_eq!(view.issues[0].code, "MALFORMED_PAYLOAD");

    let vocabulary_analysis = view
        .feedback_detail
        .detailed_analysis
        .iter()
        .find(|item| item.category == Category::Vocabulary)
        .expect("vocabulary item");
    assert!(vocabulary_analysis.suggestions.error().is_some());
    assert!(view.score_summary.component_scores[1].fill.error().is_some());
    assert!(view.score_summary.metrics[1].value.error().is_some());

    assert!(view.feedback_detail.strengths.body.ready().is_some());
    assert!(view.feedback_detail.areas_for_improvement.body.ready().is_some());
    assert!(view.feedback_detail.recommendations.body.ready().is_some());
    assert!(view.score_summary.overall.ready().is_some());
    assert!(view.score_summary.component_scores[0].fill.ready().is_some());
    assert!(view.score_summary.component_scores[2].fill.ready().is_some());
}

#[test]
fn out_of_range_overall_score_is_reported_and_strict_decode_fails() {
    let mut payload = complete_payload();
    payload["overall_score"] = json!(-0.2);

    let view = render_evaluation(&DecodedEvaluation::from_value(&payload));
    let error = view.score_summary.overall.error().expect("overall error");
    assert_eq!(error.code, "OUT_OF_RANGE_SCORE");
    assert_eq!(error.path, "overall_score");

    let strict = EvaluationResult::from_value(&payload).expect_err("strict decode");
    assert_eq!(strict.kind(), &PayloadErrorKind::OutOfRange { value: -0.2 });
    assert_eq!(strict.path(), "overall_score");
}

#[test]
fn null_strengths_are_flagged_not_treated_as_empty() {
    let mut payload = complete_payload();
    payload["feedback"]["strengths"] = JsonValue::Null;

    let decoded = DecodedEvaluation::from_value(&payload);
    let error = decoded.strengths.as_ref().expect_err("null strengths");
    assert_eq!(error.kind(), &PayloadErrorKind::Null);

    let view = render_evaluation(&decoded);
    let section_error = view.feedback_detail.strengths.body.error().expect("error");
    assert_eq!(section_error.path, "feedback.strengths");
    assert!(view.feedback_detail.strengths.body.ready().is_none());
}

#[test]
fn non_string_list_entry_points_at_its_index() {
    let mut payload = complete_payload();
    payload["feedback"]["recommendations"] = json!(["Read widely", 42]);

    let view = render_evaluation(&DecodedEvaluation::from_value(&payload));
    let error = view
        .feedback_detail
        .recommendations
        .body
        .error()
        .expect("recommendations error");
    assert_eq!(error.path, "feedback.recommendations[1]");
    assert_eq!(error.code, "MALFORMED_PAYLOAD");
}

#[test]
fn score_given_as_string_is_a_type_error() {
    let mut payload = complete_payload();
    payload["detailed_analysis"]["coherence"]["score"] = json!("0.8");

    let decoded = DecodedEvaluation::from_value(&payload);
    let error = decoded.coherence.as_ref().expect_err("coherence");
    assert_eq!(error.path(), "detailed_analysis.coherence.score");
    assert!(matches!(
        error.kind(),
        PayloadErrorKind::Invalid { reason } if reason.contains("expected f64")
    ));
    assert_eq!(error.code(), "MALFORMED_PAYLOAD");
}

#[test]
fn non_object_payload_fails_every_section() {
    let view = render_evaluation(&DecodedEvaluation::from_value(&json!("oops")));

    assert_eq!(view.issues.len(), 9);
    assert!(view.issues.iter().all(|issue| issue.path == "$"));
    assert!(view.score_summary.overall.error().is_some());
    assert!(view.feedback_detail.strengths.body.error().is_some());
}

#[test]
fn extra_fields_are_ignored() {
    let mut payload = complete_payload();
    payload["model_version"] = json!("2024-06");
    payload["feedback"]["tone"] = json!("encouraging");

    let decoded = DecodedEvaluation::from_value(&payload);
    assert!(decoded.is_complete());
}
