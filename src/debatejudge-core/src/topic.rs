//! Topic parsing and stance derivation.
//!
//! A topic like "Cats vs Dogs" yields two contrasting entities and a pair of
//! comparative stances. Anything else is framed as a for/against proposition.

use std::sync::OnceLock;

use regex::Regex;

/// Matches `<phrase> (or|vs|vs.|versus) <phrase>` where a phrase is one or
/// more whitespace-separated words.
fn entity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(\w+(?:\s+\w+)*)\s+(?:or|vs\.?|versus)\s+(\w+(?:\s+\w+)*)")
            .unwrap_or_else(|e| panic!("invalid entity pattern: {}", e))
    })
}

/// Extract two contrasting entities from a topic, if present.
///
/// Only the first match is used even when the topic contains several
/// separator occurrences.
pub fn parse_entities(topic: &str) -> Option<(String, String)> {
    entity_pattern().captures(topic).map(|caps| {
        (
            caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
        )
    })
}

/// The two positions argued in a debate, fixed for its whole duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stances {
    /// What Tim argues for.
    pub tim: String,
    /// What Tina argues for.
    pub tina: String,
}

impl Stances {
    /// Derive the two stances from the topic, once, at debate start.
    pub fn derive(topic: &str) -> Self {
        match parse_entities(topic) {
            Some((entity1, entity2)) => Self {
                tim: format!("{} is better than {}", entity1, entity2),
                tina: format!("{} is better than {}", entity2, entity1),
            },
            None => Self {
                tim: format!("in favor of {}", topic),
                tina: format!("against {}", topic),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vs() {
        assert_eq!(
            parse_entities("Cats vs Dogs"),
            Some(("Cats".to_string(), "Dogs".to_string()))
        );
    }

    #[test]
    fn test_parse_versus_case_insensitive() {
        assert_eq!(
            parse_entities("remote work VERSUS office work"),
            Some(("remote work".to_string(), "office work".to_string()))
        );
    }

    #[test]
    fn test_parse_no_separator() {
        assert_eq!(parse_entities("Should pineapple go on pizza"), None);
    }

    #[test]
    fn test_parse_multiword_phrases() {
        assert_eq!(
            parse_entities("electric cars vs. gas cars"),
            Some(("electric cars".to_string(), "gas cars".to_string()))
        );
    }

    #[test]
    fn test_stances_from_entities() {
        let stances = Stances::derive("Cats vs Dogs");
        assert_eq!(stances.tim, "Cats is better than Dogs");
        assert_eq!(stances.tina, "Dogs is better than Cats");
    }

    #[test]
    fn test_stances_for_against_fallback() {
        let stances = Stances::derive("Should pineapple go on pizza");
        assert_eq!(stances.tim, "in favor of Should pineapple go on pizza");
        assert_eq!(stances.tina, "against Should pineapple go on pizza");
    }
}
