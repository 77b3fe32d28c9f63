use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured analysis returned by the AI service.
///
/// Fields are read loosely: missing or `null` values become empty, a bare
/// string stands in for a one-item list, and numbers or booleans are taken
/// as their text. Nested objects and arrays in text positions are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "loose_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "loose_list")]
    pub experience_highlights: Vec<String>,
    #[serde(default, deserialize_with = "loose_list")]
    pub education: Vec<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub overall_impression: String,
}

impl AnalysisResult {
    /// Reads a parsed AI document. Anything other than a JSON object yields
    /// the empty result.
    pub fn from_document(document: &Value) -> Self {
        match document {
            Value::Object(_) => Self::deserialize(document).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

fn loose_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(&other).into_iter().collect(),
    })
}

/// The persisted document for one analyzed resume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeRecord {
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub summary: String,
    pub experience_highlights: Vec<String>,
    pub education: Vec<String>,
    pub overall_impression: String,
    pub original_resume_text: String,
    /// The AI's JSON document exactly as returned.
    pub full_analysis: Value,
}

impl ResumeRecord {
    pub fn new(
        name: String,
        email: String,
        analysis: &AnalysisResult,
        original_resume_text: String,
        full_analysis: Value,
    ) -> Self {
        Self {
            name,
            email,
            skills: analysis.skills.clone(),
            summary: analysis.summary.clone(),
            experience_highlights: analysis.experience_highlights.clone(),
            education: analysis.education.clone(),
            overall_impression: analysis.overall_impression.clone(),
            original_resume_text,
            full_analysis,
        }
    }
}
