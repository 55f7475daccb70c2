//! Debate orchestration.
//!
//! Drives a fixed three-round exchange between Tim and Tina, then hands the
//! transcript to the judge and the transcript store. Execution is strictly
//! sequential: one model call at a time, a short pacing pause after each
//! turn, no retries and no mid-round cancellation.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::client::ModelClient;
use crate::error::DebateError;
use crate::guardrail;
use crate::judge;
use crate::settings::{self, SettingsStore};
use crate::store::TranscriptStore;
use crate::topic::Stances;
use crate::transcript::{
    Argument, DebateRecord, Speaker, Transcript, Verdict, estimated_duration_secs,
};
use crate::tts::{self, VoiceSynth};
use crate::turn;

/// Number of rounds in every debate.
pub const ROUNDS: u32 = 3;

/// The two speakers in fixed turn order within each round.
const TURN_ORDER: [Speaker; 2] = [Speaker::Tim, Speaker::Tina];

/// Models chosen for one debate.
#[derive(Debug, Clone)]
pub struct DebateSetup {
    pub topic: String,
    pub model_tim: String,
    pub model_tina: String,
    pub judge_model: String,
}

/// Where the orchestrator currently is in the debate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebatePhase {
    NotStarted,
    RoundInProgress { round: u32, speaker: Speaker },
    Judging,
    Complete,
}

/// Events emitted during a debate.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    DebateStart {
        topic: String,
        stances: Stances,
    },
    RoundStart {
        round: u32,
    },
    TurnStart {
        speaker: Speaker,
        round: u32,
    },
    TurnComplete {
        speaker: Speaker,
        round: u32,
        text: String,
    },
    JudgingStart,
    /// The estimated spoken duration exceeds the configured maximum.
    /// Advisory only; nothing is truncated.
    DurationWarning {
        estimated_secs: f64,
        max_secs: u64,
    },
    VerdictReady {
        verdict: Verdict,
        summary: String,
    },
    Stored {
        transcript_id: String,
    },
}

/// Callback for debate events.
pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// A debate that ran to completion.
#[derive(Debug, Clone)]
pub struct CompletedDebate {
    pub record: DebateRecord,
    /// Id minted by the transcript store, if one was attached.
    pub transcript_id: Option<String>,
    pub estimated_secs: f64,
}

/// Result of one orchestration run. A guardrail rejection is a normal branch
/// outcome, not an error.
#[derive(Debug, Clone)]
pub enum DebateOutcome {
    /// The topic tripped the guardrails; no model call was made.
    Blocked,
    Completed(CompletedDebate),
}

/// Orchestrates one debate from topic to persisted verdict.
pub struct DebateOrchestrator {
    setup: DebateSetup,
    client: Box<dyn ModelClient>,
    settings: Box<dyn SettingsStore>,
    store: Option<Box<dyn TranscriptStore>>,
    synth: Option<Box<dyn VoiceSynth>>,
    audio_dir: PathBuf,
    pacing: Duration,
    callback: Option<DebateCallback>,
    phase: DebatePhase,
}

impl DebateOrchestrator {
    pub fn new(
        setup: DebateSetup,
        client: Box<dyn ModelClient>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        Self {
            setup,
            client,
            settings,
            store: None,
            synth: None,
            audio_dir: PathBuf::from("audio"),
            pacing: Duration::from_secs(1),
            callback: None,
            phase: DebatePhase::NotStarted,
        }
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Attach a transcript store; the finished debate is appended to it.
    pub fn with_store(mut self, store: Box<dyn TranscriptStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a speech synthesizer writing one WAV per turn into `audio_dir`.
    pub fn with_synth(mut self, synth: Box<dyn VoiceSynth>, audio_dir: impl Into<PathBuf>) -> Self {
        self.synth = Some(synth);
        self.audio_dir = audio_dir.into();
        self
    }

    /// Pause inserted after each turn, for display pacing only.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn phase(&self) -> DebatePhase {
        self.phase
    }

    /// Run the debate start to finish.
    ///
    /// The guardrail check happens exactly once, on the raw topic, before any
    /// model call; a failing topic returns `DebateOutcome::Blocked`. A store
    /// fault after judging propagates and aborts the run.
    pub async fn run(&mut self) -> Result<DebateOutcome, DebateError> {
        if !guardrail::check_with_settings(&self.setup.topic, self.settings.as_ref())? {
            info!(topic = %self.setup.topic, "topic rejected by guardrails");
            self.phase = DebatePhase::Complete;
            return Ok(DebateOutcome::Blocked);
        }

        // Stances are derived once and never recomputed mid-debate.
        let stances = Stances::derive(&self.setup.topic);
        self.emit(DebateEvent::DebateStart {
            topic: self.setup.topic.clone(),
            stances: stances.clone(),
        });

        let mut transcript = Transcript::new();
        let mut audio_refs: Vec<String> = Vec::new();

        for round in 1..=ROUNDS {
            self.emit(DebateEvent::RoundStart { round });

            for speaker in TURN_ORDER {
                self.phase = DebatePhase::RoundInProgress { round, speaker };
                self.emit(DebateEvent::TurnStart { speaker, round });

                let (stance, model_id) = match speaker {
                    Speaker::Tim => (stances.tim.as_str(), self.setup.model_tim.as_str()),
                    Speaker::Tina => (stances.tina.as_str(), self.setup.model_tina.as_str()),
                };

                let prior = transcript.joined_text();
                let text = turn::generate_turn(
                    self.client.as_ref(),
                    self.settings.as_ref(),
                    &self.setup.topic,
                    speaker,
                    stance,
                    model_id,
                    round,
                    &prior,
                )
                .await?;

                transcript.push(Argument {
                    speaker,
                    round,
                    text: text.clone(),
                });
                self.emit(DebateEvent::TurnComplete {
                    speaker,
                    round,
                    text: text.clone(),
                });

                self.synthesize_turn(speaker, round, &text, &mut audio_refs);

                if !self.pacing.is_zero() {
                    tokio::time::sleep(self.pacing).await;
                }
            }
        }

        self.phase = DebatePhase::Judging;
        self.emit(DebateEvent::JudgingStart);

        let estimated_secs = estimated_duration_secs(transcript.word_count());
        let max_secs = settings::max_debate_duration(self.settings.as_ref())?;
        if estimated_secs > max_secs as f64 {
            self.emit(DebateEvent::DurationWarning {
                estimated_secs,
                max_secs,
            });
        }

        let (verdict, summary) = judge::judge_debate(
            self.client.as_ref(),
            self.settings.as_ref(),
            &transcript,
            &self.setup.judge_model,
            &stances,
        )
        .await?;
        self.emit(DebateEvent::VerdictReady {
            verdict: verdict.clone(),
            summary: summary.clone(),
        });

        let record = DebateRecord {
            topic: self.setup.topic.clone(),
            transcript,
            verdict,
            summary,
            audio_refs,
            model_tim: self.setup.model_tim.clone(),
            model_tina: self.setup.model_tina.clone(),
        };

        let transcript_id = match self.store.as_mut() {
            Some(store) => {
                let id = store.append(&record)?;
                self.emit(DebateEvent::Stored {
                    transcript_id: id.clone(),
                });
                Some(id)
            }
            None => None,
        };

        self.phase = DebatePhase::Complete;
        Ok(DebateOutcome::Completed(CompletedDebate {
            record,
            transcript_id,
            estimated_secs,
        }))
    }

    /// Best-effort audio for one turn; failures are logged and the audio is
    /// simply missing from `audio_refs`.
    fn synthesize_turn(
        &mut self,
        speaker: Speaker,
        round: u32,
        text: &str,
        audio_refs: &mut Vec<String>,
    ) {
        let Some(synth) = self.synth.as_mut() else {
            return;
        };

        let voice = tts::default_voice(speaker);
        let Some(samples) = synth.synthesize(text, voice) else {
            return;
        };

        if let Err(e) = fs::create_dir_all(&self.audio_dir) {
            warn!(dir = %self.audio_dir.display(), error = %e, "cannot create audio dir");
            return;
        }

        let path = self
            .audio_dir
            .join(format!("{}_round_{}.wav", speaker.name().to_lowercase(), round));
        match synth.save_wav(&path, &samples) {
            Ok(()) => audio_refs.push(path.to_string_lossy().into_owned()),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save audio"),
        }
    }

    fn emit(&self, event: DebateEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}
