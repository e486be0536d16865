use crate::models::evaluation::{Category, DecodedEvaluation, Score};
use crate::models::view::{
    BarFill, GradeItem, MetricItem, ScoreBadge, ScoreBar, ScoreSummaryView, SectionView,
};
use crate::services::result_classifier::{color_band, format_percent, percent_value};

pub const SUMMARY_HEADING: &str = "Evaluation Results";
pub const OVERALL_CAPTION: &str = "Overall Score";
pub const COMPONENT_HEADING: &str = "Component Scores";
pub const METRICS_HEADING: &str = "Detailed Metrics";

/// Builds the score panel: overall badge, grade labels, one bar per category
/// and the three headline metrics.
pub fn render_score_summary(evaluation: &DecodedEvaluation) -> ScoreSummaryView {
    let overall = SectionView::from_result(evaluation.overall_score.as_ref(), |score| ScoreBadge {
        value_label: format_percent(*score),
        color: color_band(*score),
        caption: OVERALL_CAPTION,
    });

    let grades = vec![
        GradeItem {
            label: "CEFR Level",
            value: SectionView::from_result(evaluation.cefr_level.as_ref(), String::clone),
        },
        GradeItem {
            label: "Letter Grade",
            value: SectionView::from_result(evaluation.letter_grade.as_ref(), String::clone),
        },
    ];

    let component_scores = Category::ALL
        .into_iter()
        .map(|category| ScoreBar {
            category,
            label: category.label(),
            fill: SectionView::from_result(evaluation.category_score(category), bar_fill),
        })
        .collect();

    ScoreSummaryView {
        heading: SUMMARY_HEADING,
        overall,
        grades,
        component_heading: COMPONENT_HEADING,
        component_scores,
        metrics_heading: METRICS_HEADING,
        metrics: render_metrics(evaluation),
    }
}

fn bar_fill(score: Score) -> BarFill {
    BarFill {
        fill_percent: percent_value(score),
        color: color_band(score),
        value_label: format_percent(score),
    }
}

fn render_metrics(evaluation: &DecodedEvaluation) -> Vec<MetricItem> {
    vec![
        MetricItem {
            category: Category::Grammar,
            label: "Grammar Errors",
            value: SectionView::from_result(evaluation.grammar.as_ref(), |analysis| {
                analysis.feedback.error_count
            }),
        },
        MetricItem {
            category: Category::Vocabulary,
            label: "Unique Words",
            value: SectionView::from_result(evaluation.vocabulary.as_ref(), |analysis| {
                analysis.feedback.unique_words()
            }),
        },
        MetricItem {
            category: Category::Coherence,
            label: "Paragraphs",
            value: SectionView::from_result(evaluation.coherence.as_ref(), |analysis| {
                analysis.feedback.total_paragraphs()
            }),
        },
    ]
}
