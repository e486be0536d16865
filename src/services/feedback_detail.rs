use crate::models::evaluation::{Category, DecodedEvaluation, PayloadError};
use crate::models::view::{
    AnalysisItem, FeedbackDetailView, FeedbackSection, ListMarker, SectionBody, SectionView,
};

pub const FEEDBACK_HEADING: &str = "Detailed Feedback";
pub const ANALYSIS_HEADING: &str = "Detailed Analysis";
pub const NO_STRENGTHS_MESSAGE: &str = "No specific strengths identified.";
pub const NO_IMPROVEMENTS_MESSAGE: &str = "No specific areas for improvement identified.";
pub const FEEDBACK_NOTE: &str = "Note: This feedback is generated automatically based on \
linguistic analysis. Consider consulting with a human editor for comprehensive review.";

/// Builds the qualitative feedback panel. List entries keep the evaluator's
/// order; nothing is sorted, merged or truncated.
pub fn render_feedback_detail(evaluation: &DecodedEvaluation) -> FeedbackDetailView {
    FeedbackDetailView {
        heading: FEEDBACK_HEADING,
        strengths: FeedbackSection {
            heading: "Strengths",
            body: list_or_placeholder(
                evaluation.strengths.as_ref(),
                ListMarker::Check,
                NO_STRENGTHS_MESSAGE,
            ),
        },
        areas_for_improvement: FeedbackSection {
            heading: "Areas for Improvement",
            body: list_or_placeholder(
                evaluation.areas_for_improvement.as_ref(),
                ListMarker::Arrow,
                NO_IMPROVEMENTS_MESSAGE,
            ),
        },
        // An empty recommendations list still renders as a (blank) list.
        recommendations: FeedbackSection {
            heading: "Recommendations",
            body: SectionView::from_result(evaluation.recommendations.as_ref(), |items| {
                SectionBody::List {
                    marker: ListMarker::Bullet,
                    items: items.clone(),
                }
            }),
        },
        analysis_heading: ANALYSIS_HEADING,
        detailed_analysis: Category::ALL
            .into_iter()
            .map(|category| AnalysisItem {
                category,
                heading: category.analysis_heading(),
                suggestions: SectionView::from_result(
                    evaluation.suggestions(category),
                    <[String]>::to_vec,
                ),
            })
            .collect(),
        note: FEEDBACK_NOTE,
    }
}

fn list_or_placeholder(
    entries: Result<&Vec<String>, &PayloadError>,
    marker: ListMarker,
    placeholder: &'static str,
) -> SectionView<SectionBody> {
    SectionView::from_result(entries, |items| {
        if items.is_empty() {
            SectionBody::Placeholder {
                message: placeholder,
            }
        } else {
            SectionBody::List {
                marker,
                items: items.clone(),
            }
        }
    })
}
