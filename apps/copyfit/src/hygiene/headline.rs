use std::sync::OnceLock;

use regex::Regex;

use crate::hygiene::text::{is_stop_word, tokenize};
use crate::tunables::{
    MAX_TRAILING_STOPWORDS, MIN_HEADLINE_TOKENS, QUALITY_BAD_QUESTION, QUALITY_GENERIC_VERB,
    QUALITY_TOO_SHORT, QUALITY_TRAILING_STOPWORD,
};

/// Verbs that make a weak last word ("... you need to try").
const GENERIC_VERBS: &[&str] = &[
    "get", "make", "do", "have", "see", "go", "try", "start", "use", "know", "be", "need",
];

const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '…', '-', '–', '—', '"', '\'', '“', '”', '‘', '’',
];

fn interrogative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(what|how)\b").expect("valid regex"))
}

/// Headline opens with a "what/how" question pattern.
pub fn is_interrogative(text: &str) -> bool {
    interrogative_re().is_match(text)
}

/// Normalizes a headline's ending. Returns `None` when fewer than three tokens remain.
///
/// - stray trailing punctuation is removed, then up to two trailing stop-words;
/// - interrogative headlines always end in `?`; a trailing `!` is preserved otherwise.
pub fn clean_headline(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let exclaims = collapsed.trim_end().ends_with('!');
    let mut words: Vec<&str> = collapsed
        .trim_end_matches(TRAILING_PUNCTUATION)
        .split(' ')
        .filter(|w| !w.is_empty())
        .collect();

    for _ in 0..MAX_TRAILING_STOPWORDS {
        let Some(last) = words.last() else { break };
        let bare = last.trim_matches(TRAILING_PUNCTUATION).to_lowercase();
        if !is_stop_word(&bare) {
            break;
        }
        words.pop();
    }

    let mut cleaned = words.join(" ");
    cleaned.truncate(cleaned.trim_end_matches(TRAILING_PUNCTUATION).len());
    if tokenize(&cleaned).len() < MIN_HEADLINE_TOKENS {
        return None;
    }

    if is_interrogative(&cleaned) {
        cleaned.push('?');
    } else if exclaims {
        cleaned.push('!');
    }
    Some(cleaned)
}

/// Additive penalty for weak copy: an interrogative without `?`, a trailing stop-word,
/// fewer than three tokens, or a trailing generic verb.
pub fn text_quality_penalty(text: &str) -> f32 {
    let trimmed = text.trim();
    let tokens = tokenize(trimmed);
    let mut penalty = 0.0;

    if is_interrogative(trimmed) && !trimmed.ends_with('?') {
        penalty += QUALITY_BAD_QUESTION;
    }
    if tokens.len() < MIN_HEADLINE_TOKENS {
        penalty += QUALITY_TOO_SHORT;
    }
    if let Some(last) = tokens.last() {
        if is_stop_word(last) {
            penalty += QUALITY_TRAILING_STOPWORD;
        }
        if GENERIC_VERBS.contains(&last.as_str()) {
            penalty += QUALITY_GENERIC_VERB;
        }
    }
    penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrogative_detection() {
        assert!(is_interrogative("How to bake better bread"));
        assert!(is_interrogative("  what makes great coffee"));
        assert!(!is_interrogative("However you slice it"));
        assert!(!is_interrogative("Bread that rises"));
    }

    #[test]
    fn test_clean_strips_trailing_stop_words() {
        assert_eq!(
            clean_headline("Fresh bread delivered to the").as_deref(),
            Some("Fresh bread delivered")
        );
    }

    #[test]
    fn test_clean_strips_at_most_two_stop_words() {
        // "for", "of", "the" trail; only two go.
        assert_eq!(
            clean_headline("Bread worth waiting for of the").as_deref(),
            Some("Bread worth waiting for")
        );
    }

    #[test]
    fn test_clean_enforces_question_mark() {
        assert_eq!(
            clean_headline("How to bake better bread.").as_deref(),
            Some("How to bake better bread?")
        );
    }

    #[test]
    fn test_clean_removes_stray_punctuation_keeps_bang() {
        assert_eq!(
            clean_headline("Bake better bread today,").as_deref(),
            Some("Bake better bread today")
        );
        assert_eq!(
            clean_headline("Bake better bread today!").as_deref(),
            Some("Bake better bread today!")
        );
    }

    #[test]
    fn test_clean_rejects_short_results() {
        assert!(clean_headline("Fresh bread for the").is_none());
        assert!(clean_headline("Hello").is_none());
    }

    #[test]
    fn test_quality_penalty_components() {
        assert_eq!(text_quality_penalty("Fresh bread delivered daily"), 0.0);
        let unterminated = text_quality_penalty("How to bake better bread");
        assert!((unterminated - QUALITY_BAD_QUESTION).abs() < 1e-6);
        let trailing = text_quality_penalty("Fresh bread delivered to");
        assert!((trailing - QUALITY_TRAILING_STOPWORD).abs() < 1e-6);
        let short = text_quality_penalty("Fresh bread");
        assert!(short >= QUALITY_TOO_SHORT);
        let verb = text_quality_penalty("Bread you need to try");
        assert!((verb - QUALITY_GENERIC_VERB).abs() < 1e-6);
    }
}
