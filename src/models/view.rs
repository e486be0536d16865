//! View models handed to the webview. Each one is a pure function of a
//! decoded evaluation; the frontend only lays them out.

use serde::Serialize;
use std::fmt;

use crate::models::evaluation::{Category, PayloadError};

/// Display color band for a score. Serializes to the CSS color name.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Orange,
    Red,
}

impl ScoreBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBand::Green => "green",
            ScoreBand::Orange => "orange",
            ScoreBand::Red => "red",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visible error indicator shown in place of a section that could not be
/// rendered from the payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SectionError {
    pub code: String,
    pub message: String,
    pub path: String,
}

impl From<&PayloadError> for SectionError {
    fn from(error: &PayloadError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.kind().to_string(),
            path: error.path().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum SectionView<T> {
    Ready(T),
    Error(SectionError),
}

impl<T> SectionView<T> {
    pub fn from_result<U>(result: Result<U, &PayloadError>, render: impl FnOnce(U) -> T) -> Self {
        match result {
            Ok(value) => SectionView::Ready(render(value)),
            Err(error) => SectionView::Error(SectionError::from(error)),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            SectionView::Ready(content) => Some(content),
            SectionView::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&SectionError> {
        match self {
            SectionView::Ready(_) => None,
            SectionView::Error(error) => Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBadge {
    pub value_label: String,
    pub color: ScoreBand,
    pub caption: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeItem {
    pub label: &'static str,
    pub value: SectionView<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarFill {
    pub fill_percent: f64,
    pub color: ScoreBand,
    pub value_label: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBar {
    pub category: Category,
    pub label: &'static str,
    pub fill: SectionView<BarFill>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricItem {
    pub category: Category,
    pub label: &'static str,
    pub value: SectionView<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummaryView {
    pub heading: &'static str,
    pub overall: SectionView<ScoreBadge>,
    pub grades: Vec<GradeItem>,
    pub component_heading: &'static str,
    pub component_scores: Vec<ScoreBar>,
    pub metrics_heading: &'static str,
    pub metrics: Vec<MetricItem>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListMarker {
    Check,
    Arrow,
    Bullet,
}

impl ListMarker {
    pub fn glyph(&self) -> &'static str {
        match self {
            ListMarker::Check => "✓",
            ListMarker::Arrow => "→",
            ListMarker::Bullet => "•",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SectionBody {
    List {
        marker: ListMarker,
        items: Vec<String>,
    },
    Placeholder {
        message: &'static str,
    },
}

impl SectionBody {
    pub fn items(&self) -> &[String] {
        match self {
            SectionBody::List { items, .. } => items,
            SectionBody::Placeholder { .. } => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            SectionBody::List { .. } => None,
            SectionBody::Placeholder { message } => Some(*message),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSection {
    pub heading: &'static str,
    pub body: SectionView<SectionBody>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisItem {
    pub category: Category,
    pub heading: &'static str,
    pub suggestions: SectionView<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDetailView {
    pub heading: &'static str,
    pub strengths: FeedbackSection,
    pub areas_for_improvement: FeedbackSection,
    pub recommendations: FeedbackSection,
    pub analysis_heading: &'static str,
    pub detailed_analysis: Vec<AnalysisItem>,
    pub note: &'static str,
}

/// Both result panels plus the snapshot they were rendered from.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    pub score_summary: ScoreSummaryView,
    pub feedback_detail: FeedbackDetailView,
    pub issues: Vec<SectionError>,
}
