use std::fmt;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use serde_path_to_error::{Path, Segment};
use thiserror::Error;

/// A score reported by the evaluator, guaranteed to lie in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl Score {
    /// Returns `None` for NaN, infinities and anything outside `[0.0, 1.0]`.
    pub fn new(value: f64) -> Option<Self> {
        if (0.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("score {0} is outside [0, 1]")]
pub struct ScoreOutOfRange(pub f64);

impl TryFrom<f64> for Score {
    type Error = ScoreOutOfRange;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value).ok_or(ScoreOutOfRange(value))
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Grammar,
    Vocabulary,
    Coherence,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Grammar, Category::Vocabulary, Category::Coherence];

    /// Key under `detailed_analysis` in the evaluator payload.
    pub fn key(self) -> &'static str {
        match self {
            Category::Grammar => "grammar",
            Category::Vocabulary => "vocabulary",
            Category::Coherence => "coherence",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Grammar => "Grammar",
            Category::Vocabulary => "Vocabulary",
            Category::Coherence => "Coherence",
        }
    }

    pub fn analysis_heading(self) -> &'static str {
        match self {
            Category::Grammar => "Grammar Analysis",
            Category::Vocabulary => "Vocabulary Analysis",
            Category::Coherence => "Coherence Analysis",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadErrorKind {
    #[error("required field is missing")]
    Missing,
    #[error("field is null")]
    Null,
    #[error("{reason}")]
    Invalid { reason: String },
    #[error("score {value} is outside [0, 1]")]
    OutOfRange { value: f64 },
}

/// A decode failure pinned to the dotted payload path where it occurred.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("`{path}`: {kind}")]
pub struct PayloadError {
    path: String,
    kind: PayloadErrorKind,
}

impl PayloadError {
    pub fn new(path: impl Into<String>, kind: PayloadErrorKind) -> Self {
        let path = path.into();
        Self {
            path: if path.is_empty() { "$".to_string() } else { path },
            kind,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> &PayloadErrorKind {
        &self.kind
    }

    pub fn code(&self) -> &'static str {
        match self.kind {
            PayloadErrorKind::OutOfRange { .. } => "OUT_OF_RANGE_SCORE",
            _ => "MALFORMED_PAYLOAD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAnalysis<F> {
    pub score: Score,
    pub feedback: F,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarFeedback {
    pub suggestions: Vec<String>,
    pub error_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyFeedback {
    pub suggestions: Vec<String>,
    pub metrics: VocabularyMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyMetrics {
    pub unique_words: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceFeedback {
    pub suggestions: Vec<String>,
    pub analysis: CoherenceAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceAnalysis {
    pub paragraph_structure: ParagraphStructure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStructure {
    pub total_paragraphs: u64,
}

impl VocabularyFeedback {
    pub fn unique_words(&self) -> u64 {
        self.metrics.unique_words
    }
}

impl CoherenceFeedback {
    pub fn total_paragraphs(&self) -> u64 {
        self.analysis.paragraph_structure.total_paragraphs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub grammar: CategoryAnalysis<GrammarFeedback>,
    pub vocabulary: CategoryAnalysis<VocabularyFeedback>,
    pub coherence: CategoryAnalysis<CoherenceFeedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
}

/// A fully valid evaluation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub overall_score: Score,
    pub cefr_level: String,
    pub letter_grade: String,
    pub detailed_analysis: DetailedAnalysis,
    pub feedback: FeedbackSummary,
}

impl EvaluationResult {
    /// Strict decode: the first malformed section fails the whole payload.
    pub fn from_value(payload: &JsonValue) -> Result<Self, PayloadError> {
        DecodedEvaluation::from_value(payload).into_result()
    }
}

// Section containers. Each slot keeps its raw value so that a bad section
// cannot fail its siblings; `None` means the key was absent.

#[derive(Debug, Deserialize)]
struct EvaluationPayload {
    #[serde(default, deserialize_with = "present")]
    overall_score: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    cefr_level: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    letter_grade: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    detailed_analysis: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    feedback: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct AnalysisSections {
    #[serde(default, deserialize_with = "present")]
    grammar: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    vocabulary: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    coherence: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct FeedbackSections {
    #[serde(default, deserialize_with = "present")]
    strengths: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    areas_for_improvement: Option<JsonValue>,
    #[serde(default, deserialize_with = "present")]
    recommendations: Option<JsonValue>,
}

/// Keeps an explicit `null` as `Some(Null)` so it is told apart from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// A payload decoded part by part, so that each view section can render or
/// report its own failure independently of the others.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvaluation {
    pub overall_score: Result<Score, PayloadError>,
    pub cefr_level: Result<String, PayloadError>,
    pub letter_grade: Result<String, PayloadError>,
    pub grammar: Result<CategoryAnalysis<GrammarFeedback>, PayloadError>,
    pub vocabulary: Result<CategoryAnalysis<VocabularyFeedback>, PayloadError>,
    pub coherence: Result<CategoryAnalysis<CoherenceFeedback>, PayloadError>,
    pub strengths: Result<Vec<String>, PayloadError>,
    pub areas_for_improvement: Result<Vec<String>, PayloadError>,
    pub recommendations: Result<Vec<String>, PayloadError>,
}

impl DecodedEvaluation {
    pub fn from_value(payload: &JsonValue) -> Self {
        let root: EvaluationPayload = match decode_sections(Some(payload.clone()), "") {
            Ok(root) => root,
            Err(error) => return Self::failed(error),
        };

        let analysis: Result<AnalysisSections, PayloadError> =
            decode_sections(root.detailed_analysis, "detailed_analysis");
        let (grammar, vocabulary, coherence) = match analysis {
            Ok(sections) => (
                decode_section(sections.grammar, "detailed_analysis.grammar"),
                decode_section(sections.vocabulary, "detailed_analysis.vocabulary"),
                decode_section(sections.coherence, "detailed_analysis.coherence"),
            ),
            Err(error) => (Err(error.clone()), Err(error.clone()), Err(error)),
        };

        let feedback: Result<FeedbackSections, PayloadError> =
            decode_sections(root.feedback, "feedback");
        let (strengths, areas_for_improvement, recommendations) = match feedback {
            Ok(sections) => (
                decode_section(sections.strengths, "feedback.strengths"),
                decode_section(
                    sections.areas_for_improvement,
                    "feedback.areas_for_improvement",
                ),
                decode_section(sections.recommendations, "feedback.recommendations"),
            ),
            Err(error) => (Err(error.clone()), Err(error.clone()), Err(error)),
        };

        Self {
            overall_score: decode_section(root.overall_score, "overall_score"),
            cefr_level: decode_section(root.cefr_level, "cefr_level"),
            letter_grade: decode_section(root.letter_grade, "letter_grade"),
            grammar,
            vocabulary,
            coherence,
            strengths,
            areas_for_improvement,
            recommendations,
        }
    }

    /// Every section fails with the same root-level error.
    fn failed(error: PayloadError) -> Self {
        Self {
            overall_score: Err(error.clone()),
            cefr_level: Err(error.clone()),
            letter_grade: Err(error.clone()),
            grammar: Err(error.clone()),
            vocabulary: Err(error.clone()),
            coherence: Err(error.clone()),
            strengths: Err(error.clone()),
            areas_for_improvement: Err(error.clone()),
            recommendations: Err(error),
        }
    }

    pub fn errors(&self) -> Vec<&PayloadError> {
        [
            self.overall_score.as_ref().err(),
            self.cefr_level.as_ref().err(),
            self.letter_grade.as_ref().err(),
            self.grammar.as_ref().err(),
            self.vocabulary.as_ref().err(),
            self.coherence.as_ref().err(),
            self.strengths.as_ref().err(),
            self.areas_for_improvement.as_ref().err(),
            self.recommendations.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.errors().is_empty()
    }

    pub fn category_score(&self, category: Category) -> Result<Score, &PayloadError> {
        match category {
            Category::Grammar => self.grammar.as_ref().map(|analysis| analysis.score),
            Category::Vocabulary => self.vocabulary.as_ref().map(|analysis| analysis.score),
            Category::Coherence => self.coherence.as_ref().map(|analysis| analysis.score),
        }
    }

    pub fn suggestions(&self, category: Category) -> Result<&[String], &PayloadError> {
        match category {
            Category::Grammar => self
                .grammar
                .as_ref()
                .map(|analysis| analysis.feedback.suggestions.as_slice()),
            Category::Vocabulary => self
                .vocabulary
                .as_ref()
                .map(|analysis| analysis.feedback.suggestions.as_slice()),
            Category::Coherence => self
                .coherence
                .as_ref()
                .map(|analysis| analysis.feedback.suggestions.as_slice()),
        }
    }

    pub fn into_result(self) -> Result<EvaluationResult, PayloadError> {
        Ok(EvaluationResult {
            overall_score: self.overall_score?,
            cefr_level: self.cefr_level?,
            letter_grade: self.letter_grade?,
            detailed_analysis: DetailedAnalysis {
                grammar: self.grammar?,
                vocabulary: self.vocabulary?,
                coherence: self.coherence?,
            },
            feedback: FeedbackSummary {
                strengths: self.strengths?,
                areas_for_improvement: self.areas_for_improvement?,
                recommendations: self.recommendations?,
            },
        })
    }
}

impl From<EvaluationResult> for DecodedEvaluation {
    fn from(result: EvaluationResult) -> Self {
        Self {
            overall_score: Ok(result.overall_score),
            cefr_level: Ok(result.cefr_level),
            letter_grade: Ok(result.letter_grade),
            grammar: Ok(result.detailed_analysis.grammar),
            vocabulary: Ok(result.detailed_analysis.vocabulary),
            coherence: Ok(result.detailed_analysis.coherence),
            strengths: Ok(result.feedback.strengths),
            areas_for_improvement: Ok(result.feedback.areas_for_improvement),
            recommendations: Ok(result.feedback.recommendations),
        }
    }
}

fn decode_section<T: DeserializeOwned>(
    slot: Option<JsonValue>,
    path: &str,
) -> Result<T, PayloadError> {
    match slot {
        None => Err(PayloadError::new(path, PayloadErrorKind::Missing)),
        Some(JsonValue::Null) => Err(PayloadError::new(path, PayloadErrorKind::Null)),
        Some(value) => decode_at(&value, path),
    }
}

/// Section containers must be JSON objects; serde would otherwise accept an
/// array positionally.
fn decode_sections<T: DeserializeOwned>(
    slot: Option<JsonValue>,
    path: &str,
) -> Result<T, PayloadError> {
    match slot {
        Some(JsonValue::Object(_)) | None | Some(JsonValue::Null) => decode_section(slot, path),
        Some(other) => Err(PayloadError::new(
            path,
            PayloadErrorKind::Invalid {
                reason: format!("expected an object, found {}", json_kind(&other)),
            },
        )),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Deserializes `value`, which sits at `base` in the payload, and pins any
/// failure to the full path of the offending field.
fn decode_at<T: DeserializeOwned>(value: &JsonValue, base: &str) -> Result<T, PayloadError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = join_path(base, err.path());
        let kind = match lookup(value, err.path()) {
            Some(JsonValue::Null) => PayloadErrorKind::Null,
            Some(JsonValue::Number(number)) if is_score_field(&path) => match number.as_f64() {
                Some(raw) if Score::new(raw).is_none() => PayloadErrorKind::OutOfRange { value: raw },
                _ => PayloadErrorKind::Invalid {
                    reason: err.inner().to_string(),
                },
            },
            _ => PayloadErrorKind::Invalid {
                reason: err.inner().to_string(),
            },
        };
        PayloadError::new(path, kind)
    })
}

fn is_score_field(path: &str) -> bool {
    path == "overall_score" || path.ends_with(".score")
}

fn lookup<'a>(value: &'a JsonValue, path: &Path) -> Option<&'a JsonValue> {
    path.iter().try_fold(value, |node, segment| match segment {
        Segment::Seq { index } => node.get(*index),
        Segment::Map { key } => node.get(key.as_str()),
        _ => None,
    })
}

fn join_path(base: &str, path: &Path) -> String {
    path.iter().fold(base.to_string(), |mut joined, segment| {
        match segment {
            Segment::Seq { index } => joined.push_str(&format!("[{index}]")),
            Segment::Map { key } | Segment::Enum { variant: key } => {
                if !joined.is_empty() {
                    joined.push('.');
                }
                joined.push_str(key);
            }
            Segment::Unknown => joined.push_str("[?]"),
        }
        joined
    })
}
