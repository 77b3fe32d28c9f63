//! In-memory collaborators for exercising the pipeline without a PDF
//! library, network or database.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::analysis::ports::{
    AiAnalyzer, AiServiceFailure, Candidate, Completion, ExtractionFailure, ResumeStore,
    StoreFailure, TextExtractor,
};
use crate::models::resume::ResumeRecord;

pub(crate) fn completion_with(content: &str) -> Completion {
    Completion {
        candidates: vec![Candidate {
            content: Some(content.to_string()),
        }],
    }
}

/// Returns the same extraction outcome for every input and remembers what it saw.
pub(crate) struct StaticExtractor {
    outcome: Result<String, ExtractionFailure>,
    inputs: Mutex<Vec<Vec<u8>>>,
}

impl StaticExtractor {
    pub(crate) fn text(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(failure: ExtractionFailure) -> Self {
        Self {
            outcome: Err(failure),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    pub(crate) fn last_input(&self) -> Option<Vec<u8>> {
        self.inputs.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionFailure> {
        self.inputs.lock().unwrap().push(bytes.to_vec());
        self.outcome.clone()
    }
}

/// Answers every prompt with one scripted outcome.
pub(crate) struct ScriptedAnalyzer {
    outcome: Result<Completion, AiServiceFailure>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl ScriptedAnalyzer {
    pub(crate) fn answering(completion: Completion) -> Self {
        Self {
            outcome: Ok(completion),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(failure: AiServiceFailure) -> Self {
        Self {
            outcome: Err(failure),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }

    pub(crate) fn json_flags(&self) -> Vec<bool> {
        self.calls.lock().unwrap().iter().map(|(_, json)| *json).collect()
    }
}

#[async_trait]
impl AiAnalyzer for ScriptedAnalyzer {
    async fn complete(
        &self,
        prompt: &str,
        expect_json: bool,
    ) -> Result<Completion, AiServiceFailure> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), expect_json));
        self.outcome.clone()
    }
}

/// Keeps inserted records, or rejects every insert with a fixed failure.
#[derive(Default)]
pub(crate) struct RecordingStore {
    failure: Option<StoreFailure>,
    records: Mutex<Vec<ResumeRecord>>,
}

impl RecordingStore {
    pub(crate) fn failing(failure: StoreFailure) -> Self {
        Self {
            failure: Some(failure),
            records: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn records(&self) -> Vec<ResumeRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeStore for RecordingStore {
    async fn insert(&self, record: &ResumeRecord) -> Result<(), StoreFailure> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
