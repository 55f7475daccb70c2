//! Debate data model: speakers, arguments, transcripts, and verdicts.

use serde::{Deserialize, Serialize};

/// Words-per-minute rate used to estimate spoken duration.
const SPOKEN_WORDS_PER_MINUTE: f64 = 150.0;

/// One of the two fixed debate identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Tim,
    Tina,
}

impl Speaker {
    pub fn name(&self) -> &'static str {
        match self {
            Speaker::Tim => "Tim",
            Speaker::Tina => "Tina",
        }
    }

    pub fn opponent(&self) -> Speaker {
        match self {
            Speaker::Tim => Speaker::Tina,
            Speaker::Tina => Speaker::Tim,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One turn's argument, attributed to a speaker and round. Never mutated
/// after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    pub speaker: Speaker,
    /// Round number, 1..=3.
    pub round: u32,
    pub text: String,
}

/// All arguments of a debate in chronological order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    arguments: Vec<Argument>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, argument: Argument) {
        self.arguments.push(argument);
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Argument texts for one speaker, in round order.
    pub fn for_speaker(&self, speaker: Speaker) -> Vec<&str> {
        self.arguments
            .iter()
            .filter(|a| a.speaker == speaker)
            .map(|a| a.text.as_str())
            .collect()
    }

    /// All argument texts so far, newline-joined in chronological order.
    /// This is the prior-context string handed to each new turn.
    pub fn joined_text(&self) -> String {
        self.arguments
            .iter()
            .map(|a| a.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Total word count across all arguments.
    pub fn word_count(&self) -> usize {
        self.arguments
            .iter()
            .map(|a| a.text.split_whitespace().count())
            .sum()
    }
}

/// Estimated spoken duration in seconds at 150 words per minute.
pub fn estimated_duration_secs(word_count: usize) -> f64 {
    word_count as f64 / SPOKEN_WORDS_PER_MINUTE * 60.0
}

/// The judge's decision: a winner and free-text reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: Speaker,
    pub reasoning: String,
}

/// Everything persisted for one finished debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRecord {
    pub topic: String,
    pub transcript: Transcript,
    pub verdict: Verdict,
    pub summary: String,
    /// Paths of any synthesized audio files, in turn order.
    pub audio_refs: Vec<String>,
    pub model_tim: String,
    pub model_tina: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argument(speaker: Speaker, round: u32, text: &str) -> Argument {
        Argument {
            speaker,
            round,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_joined_text_chronological() {
        let mut transcript = Transcript::new();
        transcript.push(argument(Speaker::Tim, 1, "first"));
        transcript.push(argument(Speaker::Tina, 1, "second"));
        transcript.push(argument(Speaker::Tim, 2, "third"));
        assert_eq!(transcript.joined_text(), "first\nsecond\nthird");
    }

    #[test]
    fn test_for_speaker_filters_in_order() {
        let mut transcript = Transcript::new();
        transcript.push(argument(Speaker::Tim, 1, "tim one"));
        transcript.push(argument(Speaker::Tina, 1, "tina one"));
        transcript.push(argument(Speaker::Tim, 2, "tim two"));
        assert_eq!(transcript.for_speaker(Speaker::Tim), vec!["tim one", "tim two"]);
        assert_eq!(transcript.for_speaker(Speaker::Tina), vec!["tina one"]);
    }

    #[test]
    fn test_duration_estimate() {
        // 300 words at 150 wpm is two minutes.
        assert!((estimated_duration_secs(300) - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_word_count() {
        let mut transcript = Transcript::new();
        transcript.push(argument(Speaker::Tim, 1, "one two three"));
        transcript.push(argument(Speaker::Tina, 1, "four five"));
        assert_eq!(transcript.word_count(), 5);
    }

    #[test]
    fn test_opponent() {
        assert_eq!(Speaker::Tim.opponent(), Speaker::Tina);
        assert_eq!(Speaker::Tina.opponent(), Speaker::Tim);
    }
}
