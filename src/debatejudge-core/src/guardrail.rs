//! Guardrail filter gating topics before any model call.
//!
//! A topic fails the check if it contains a blocked word as a whole word
//! (case-insensitive) or a blocked topic as a plain substring
//! (case-insensitive). The asymmetry is deliberate: blocked words must not
//! match inside larger unrelated words, while blocked topics are treated as
//! phrases that may appear anywhere.

use regex::RegexBuilder;
use tracing::info;

use crate::error::DebateError;
use crate::settings::{self, SettingsStore};

/// Returns true if the text passes the guardrails, false if it trips a
/// blocked word or topic. Deterministic, no side effects beyond logging.
pub fn check(text: &str, blocked_words: &[String], blocked_topics: &[String]) -> bool {
    for word in blocked_words {
        let pattern = format!(r"\b{}\b", regex::escape(word));
        let matched = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(text))
            .unwrap_or(false);
        if matched {
            info!(word = %word, "guardrail tripped by blocked word");
            return false;
        }
    }

    let lowered = text.to_lowercase();
    for topic in blocked_topics {
        if lowered.contains(&topic.to_lowercase()) {
            info!(topic = %topic, "guardrail tripped by blocked topic");
            return false;
        }
    }

    true
}

/// Check a text against the blocklists currently held in settings.
pub fn check_with_settings(text: &str, store: &dyn SettingsStore) -> Result<bool, DebateError> {
    let words = settings::blocked_words(store)?;
    let topics = settings::blocked_topics(store)?;
    Ok(check(text, &words, &topics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blocked_word_whole_word_match() {
        let blocked = words(&["spam"]);
        assert!(!check("no Spam here", &blocked, &[]));
    }

    #[test]
    fn test_blocked_word_not_inside_larger_word() {
        let blocked = words(&["spam"]);
        assert!(check("spammer", &blocked, &[]));
    }

    #[test]
    fn test_blocked_topic_substring_match() {
        let blocked = words(&["crypto"]);
        // Topic matching is a plain substring test, not boundary-aware.
        assert!(!check("cryptocurrency regulation", &[], &blocked));
        assert!(!check("Is CRYPTO the future", &[], &blocked));
    }

    #[test]
    fn test_empty_blocklists_pass_everything() {
        assert!(check("anything at all", &[], &[]));
    }

    #[test]
    fn test_word_with_regex_metacharacters() {
        let blocked = words(&["c++"]);
        // Escaped literally rather than treated as a pattern.
        assert!(check("plain c here", &blocked, &[]));
    }

    #[test]
    fn test_check_with_settings() {
        use crate::settings::{MemorySettingsStore, SettingsStore};

        let store = MemorySettingsStore::new();
        store
            .set(
                "blocked_words",
                toml::Value::Array(vec![toml::Value::String("war".to_string())]),
            )
            .unwrap();

        assert!(!check_with_settings("trade war with tariffs", &store).unwrap());
        assert!(check_with_settings("warmth of the sun", &store).unwrap());
    }
}
