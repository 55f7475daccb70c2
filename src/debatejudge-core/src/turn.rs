//! Turn generation: one persuasive argument per model call.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::client::{ChatMessage, ModelClient};
use crate::error::DebateError;
use crate::settings::{self, SettingsStore};
use crate::transcript::Speaker;

/// Build the single user-role instruction for one turn.
///
/// States the topic, identity, stance, and round, carries the full prior
/// argument text as context, and asks for an argument-only reply of roughly
/// fifty words that acknowledges the opponent and does not repeat earlier
/// points.
pub fn turn_prompt(
    topic: &str,
    speaker: Speaker,
    stance: &str,
    round: u32,
    prior_arguments: &str,
) -> String {
    let context = if prior_arguments.is_empty() {
        String::new()
    } else {
        format!("Previous arguments:\n{}\n\n", prior_arguments)
    };

    format!(
        "You are an AI assistant participating in a debate. Your role is to provide concise, \
         persuasive arguments.\n\n\
         {context}You are {speaker} in a debate on the topic: '{topic}'. \
         You are arguing that {stance}. This is round {round} of 3. \
         First, briefly acknowledge the previous point made by the other participant (if any). \
         Then, provide a concise, 20-second argument (approximately 50 words) that supports \
         your side and is different from any previous arguments. Focus on a new aspect or \
         counterargument. Respond with only the argument, no additional context or \
         meta-information."
    )
}

fn preamble_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(Tim:|Tina:|Here's my argument:?\s*)")
            .unwrap_or_else(|e| panic!("invalid preamble pattern: {}", e))
    })
}

/// Strip a leading speaker label or "Here's my argument:" style preamble.
///
/// Best-effort only: models that ignore the no-preamble instruction in other
/// ways are left as-is.
pub fn clean_argument(raw: &str) -> String {
    preamble_pattern().replace(raw, "").trim().to_string()
}

/// Generate one argument for a speaker's turn.
///
/// Generation parameters are read fresh from settings for the model. A
/// transport or API fault does not abort the debate: the error text becomes
/// the argument content, logged here so the degradation is at least visible.
pub async fn generate_turn(
    client: &dyn ModelClient,
    store: &dyn SettingsStore,
    topic: &str,
    speaker: Speaker,
    stance: &str,
    model_id: &str,
    round: u32,
    prior_arguments: &str,
) -> Result<String, DebateError> {
    let params = settings::generation_params(store, model_id)?;
    let prompt = turn_prompt(topic, speaker, stance, round, prior_arguments);
    let messages = vec![ChatMessage::user(prompt)];

    let reply = match client
        .invoke(model_id, messages, params.temperature, params.max_tokens)
        .await
    {
        Ok(text) => text,
        Err(e) => {
            warn!(speaker = %speaker, round, error = %e, "model call failed, embedding error text");
            format!("Error: {}", e)
        }
    };

    Ok(clean_argument(&reply))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_argument_speaker_label() {
        assert_eq!(clean_argument("Tim: Cats are great."), "Cats are great.");
        assert_eq!(clean_argument("Tina: Dogs are loyal."), "Dogs are loyal.");
    }

    #[test]
    fn test_clean_argument_preamble() {
        assert_eq!(
            clean_argument("Here's my argument: Cats are great."),
            "Cats are great."
        );
        assert_eq!(
            clean_argument("Here's my argument Cats are great."),
            "Cats are great."
        );
    }

    #[test]
    fn test_clean_argument_no_preamble() {
        assert_eq!(clean_argument("  Cats are great.  "), "Cats are great.");
    }

    #[test]
    fn test_clean_argument_label_mid_text_kept() {
        assert_eq!(
            clean_argument("As Tim: said before"),
            "As Tim: said before"
        );
    }

    #[test]
    fn test_turn_prompt_first_round_has_no_context_block() {
        let prompt = turn_prompt("Cats vs Dogs", Speaker::Tim, "Cats is better than Dogs", 1, "");
        assert!(!prompt.contains("Previous arguments:"));
        assert!(prompt.contains("You are Tim in a debate on the topic: 'Cats vs Dogs'."));
        assert!(prompt.contains("This is round 1 of 3."));
    }

    #[test]
    fn test_turn_prompt_includes_prior_arguments() {
        let prompt = turn_prompt(
            "Cats vs Dogs",
            Speaker::Tina,
            "Dogs is better than Cats",
            2,
            "cats are independent\ndogs are loyal",
        );
        assert!(prompt.contains("Previous arguments:\ncats are independent\ndogs are loyal"));
        assert!(prompt.contains("This is round 2 of 3."));
    }
}
