//! DebateJudge Core Library
//!
//! Orchestrates a three-round debate between two model-backed participants,
//! judges the result, synthesizes speech for each turn, and persists the
//! transcript.

pub mod client;
pub mod error;
pub mod guardrail;
pub mod judge;
pub mod orchestrator;
pub mod settings;
pub mod store;
pub mod topic;
pub mod transcript;
pub mod tts;
pub mod turn;

pub use client::{ChatMessage, ModelClient, OpenAiModelClient, Role};
pub use error::DebateError;
pub use orchestrator::{
    CompletedDebate, DebateCallback, DebateEvent, DebateOrchestrator, DebateOutcome, DebatePhase,
    DebateSetup, ROUNDS,
};
pub use settings::{FileSettingsStore, GenerationParams, MemorySettingsStore, SettingsStore};
pub use store::{JsonlTranscriptStore, MemoryTranscriptStore, TranscriptStore};
pub use topic::Stances;
pub use transcript::{Argument, DebateRecord, Speaker, Transcript, Verdict};
pub use tts::{KokoroSynth, VoiceSynth};
