use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EssayType {
    #[default]
    General,
    Academic,
    Creative,
}

impl EssayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EssayType::General => "general",
            EssayType::Academic => "academic",
            EssayType::Creative => "creative",
        }
    }
}

impl fmt::Display for EssayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EssayType {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "general" => Ok(EssayType::General),
            "academic" => Ok(EssayType::Academic),
            "creative" => Ok(EssayType::Creative),
            other => Err(format!("unsupported essay type: {other}")),
        }
    }
}

impl FromStr for EssayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Essay text as submitted from the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssaySubmission {
    pub text: String,
    #[serde(default)]
    pub essay_type: EssayType,
}

impl EssaySubmission {
    pub fn new(text: impl Into<String>, essay_type: EssayType) -> Self {
        Self {
            text: text.into(),
            essay_type,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn request_body(&self) -> EvaluateRequestBody<'_> {
        EvaluateRequestBody {
            text: &self.text,
            essay_type: self.essay_type,
        }
    }
}

/// Body of `POST /evaluate`; the evaluator expects snake_case keys.
#[derive(Debug, Serialize)]
pub struct EvaluateRequestBody<'a> {
    pub text: &'a str,
    pub essay_type: EssayType,
}
