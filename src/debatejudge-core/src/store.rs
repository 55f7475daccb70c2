//! Durable persistence for finished debates.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DebateError;
use crate::transcript::DebateRecord;

/// Append-only storage of debate records. Each append mints a fresh id.
pub trait TranscriptStore: Send {
    fn append(&mut self, record: &DebateRecord) -> Result<String, DebateError>;
}

#[derive(Serialize)]
struct StoredRecord<'a> {
    debate_id: String,
    timestamp: i64,
    #[serde(flatten)]
    record: &'a DebateRecord,
}

/// One JSON object per line, appended to a local file.
pub struct JsonlTranscriptStore {
    path: PathBuf,
}

impl JsonlTranscriptStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TranscriptStore for JsonlTranscriptStore {
    fn append(&mut self, record: &DebateRecord) -> Result<String, DebateError> {
        let debate_id = Uuid::new_v4().to_string();
        let stored = StoredRecord {
            debate_id: debate_id.clone(),
            timestamp: Utc::now().timestamp(),
            record,
        };

        let line = serde_json::to_string(&stored)
            .map_err(|e| DebateError::StoreError(format!("Failed to encode record: {}", e)))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| DebateError::StoreError(format!("Failed to open store: {}", e)))?;
        writeln!(file, "{}", line)
            .map_err(|e| DebateError::StoreError(format!("Failed to write record: {}", e)))?;

        Ok(debate_id)
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryTranscriptStore {
    pub records: Vec<(String, DebateRecord)>,
}

impl MemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptStore for MemoryTranscriptStore {
    fn append(&mut self, record: &DebateRecord) -> Result<String, DebateError> {
        let debate_id = Uuid::new_v4().to_string();
        self.records.push((debate_id.clone(), record.clone()));
        Ok(debate_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Speaker, Transcript, Verdict};

    fn sample_record() -> DebateRecord {
        DebateRecord {
            topic: "Cats vs Dogs".to_string(),
            transcript: Transcript::new(),
            verdict: Verdict {
                winner: Speaker::Tim,
                reasoning: "r".to_string(),
            },
            summary: "Tim won the debate, arguing that Cats is better than Dogs.".to_string(),
            audio_refs: Vec::new(),
            model_tim: "model-a".to_string(),
            model_tina: "model-b".to_string(),
        }
    }

    #[test]
    fn test_jsonl_store_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debates.jsonl");
        let mut store = JsonlTranscriptStore::new(&path);

        let id1 = store.append(&sample_record()).unwrap();
        let id2 = store.append(&sample_record()).unwrap();
        assert_ne!(id1, id2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["debate_id"], id1);
        assert_eq!(first["topic"], "Cats vs Dogs");
        assert!(first["timestamp"].is_i64());
    }

    #[test]
    fn test_memory_store_ids_are_unique() {
        let mut store = MemoryTranscriptStore::new();
        let id1 = store.append(&sample_record()).unwrap();
        let id2 = store.append(&sample_record()).unwrap();
        assert_ne!(id1, id2);
        assert_eq!(store.records.len(), 2);
    }
}
