use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::InvalidInput;

/// Caller input for one analysis, as received over the wire.
/// Absent and empty strings both count as "not supplied".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub resume_data: Option<ResumeData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Where the resume content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    FilePath(PathBuf),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub name: String,
    pub email: String,
    pub source: ResumeSource,
}

impl AnalysisRequest {
    /// Checks identity first, then the resume source. A file path wins over
    /// inline text when both are supplied.
    pub fn validate(self) -> Result<ValidatedRequest, InvalidInput> {
        let (name, email) = match (non_empty(self.name), non_empty(self.email)) {
            (Some(name), Some(email)) => (name, email),
            _ => return Err(InvalidInput::MissingIdentity),
        };

        let resume_data = self.resume_data.ok_or(InvalidInput::MissingResumeData)?;

        let source = if let Some(path) = non_empty(resume_data.file_path) {
            ResumeSource::FilePath(PathBuf::from(path))
        } else if let Some(text) = non_empty(resume_data.text) {
            ResumeSource::Text(text)
        } else {
            return Err(InvalidInput::MissingSource);
        };

        Ok(ValidatedRequest {
            name,
            email,
            source,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
