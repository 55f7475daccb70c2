//! Speech synthesis for debate turns using kokoro-tiny.
//!
//! Synthesis is strictly best-effort: a failed synthesis is logged and the
//! audio is simply absent, never a hard error that blocks the debate or its
//! persistence.

use std::path::Path;

use kokoro_tiny::TtsEngine;
use tracing::warn;

use crate::error::DebateError;
use crate::transcript::Speaker;

/// Default voice for each speaker.
pub fn default_voice(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::Tim => "am_adam",
        Speaker::Tina => "af_sarah",
    }
}

/// A speech backend: text in, samples out, absent on failure.
pub trait VoiceSynth: Send {
    fn synthesize(&mut self, text: &str, voice_id: &str) -> Option<Vec<f32>>;

    /// Persist synthesized samples to a WAV file.
    fn save_wav(&self, path: &Path, samples: &[f32]) -> Result<(), DebateError>;
}

/// kokoro-tiny backed synthesizer.
pub struct KokoroSynth {
    engine: TtsEngine,
}

impl KokoroSynth {
    /// Initialize the TTS engine (downloads the model on first run).
    pub async fn new() -> Result<Self, DebateError> {
        let engine = TtsEngine::new()
            .await
            .map_err(|e| DebateError::TtsError(format!("Failed to initialize TTS: {}", e)))?;
        Ok(Self { engine })
    }
}

impl VoiceSynth for KokoroSynth {
    fn save_wav(&self, path: &Path, samples: &[f32]) -> Result<(), DebateError> {
        self.engine
            .save_wav(path.to_str().unwrap_or("output.wav"), samples)
            .map_err(|e| DebateError::TtsError(format!("Failed to save WAV: {}", e)))
    }

    fn synthesize(&mut self, text: &str, voice_id: &str) -> Option<Vec<f32>> {
        // kokoro has a strict input length limit, so synthesize in chunks.
        let chunks = split_into_chunks(text, 200);
        let mut all_samples = Vec::new();

        for chunk in chunks {
            if chunk.trim().is_empty() {
                continue;
            }
            match self.engine.synthesize(&chunk, Some(voice_id)) {
                Ok(samples) => {
                    all_samples.extend(samples);
                    // 0.3s pause between chunks (24kHz) to prevent cutoff.
                    all_samples.extend(vec![0.0; 7200]);
                }
                Err(e) => {
                    warn!(voice = voice_id, error = %e, "speech synthesis failed");
                    return None;
                }
            }
        }

        if all_samples.is_empty() {
            return None;
        }

        // Trailing padding so the final word is not clipped.
        all_samples.extend(vec![0.0; 12000]);
        Some(all_samples)
    }
}

/// Split text into chunks that are safe for TTS synthesis.
fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current_chunk = String::new();

    for sentence in text.split_inclusive(&['.', '!', '?', ';'][..]) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if current_chunk.len() + sentence.len() > max_chars {
            if !current_chunk.is_empty() {
                chunks.push(current_chunk.trim().to_string());
                current_chunk = String::new();
            }

            // If a single sentence is too long, split by commas.
            if sentence.len() > max_chars {
                for part in sentence.split_inclusive(',') {
                    if current_chunk.len() + part.len() > max_chars
                        && !current_chunk.is_empty()
                    {
                        chunks.push(current_chunk.trim().to_string());
                        current_chunk = String::new();
                    }
                    current_chunk.push_str(part);
                    current_chunk.push(' ');
                }
            } else {
                current_chunk.push_str(sentence);
                current_chunk.push(' ');
            }
        } else {
            current_chunk.push_str(sentence);
            current_chunk.push(' ');
        }
    }

    if !current_chunk.trim().is_empty() {
        chunks.push(current_chunk.trim().to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_into_chunks_respects_limit() {
        let text = "Hello world. This is a test. Another sentence here.";
        let chunks = split_into_chunks(text, 30);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.len() <= 35);
        }
    }

    #[test]
    fn test_split_into_chunks_short_text_single_chunk() {
        let chunks = split_into_chunks("Just one short sentence.", 200);
        assert_eq!(chunks, vec!["Just one short sentence.".to_string()]);
    }

    #[test]
    fn test_default_voices_differ_per_speaker() {
        assert_ne!(default_voice(Speaker::Tim), default_voice(Speaker::Tina));
    }
}
