//! Text primitives shared by hygiene and ranking: tokenization, canonical token sets,
//! character trigrams, order-preserving de-duplication and numeral scrubbing.
//!
//! The stop-word, stemming and synonym tables are policy: tuned to marketing copy and
//! replaceable without touching the algorithms that consume them.

use std::collections::{BTreeSet, HashSet};

/// Articles, prepositions and conjunctions. Trailing ones are stripped from headlines.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", // articles
    "about", "above", "across", "after", "against", "along", "among", "around", "at",
    "before", "behind", "below", "beneath", "beside", "between", "beyond", "by", "down",
    "during", "for", "from", "in", "inside", "into", "near", "of", "off", "on", "onto",
    "out", "over", "past", "since", "through", "throughout", "till", "to", "toward",
    "towards", "under", "until", "up", "upon", "with", "within", "without", // prepositions
    "and", "but", "or", "nor", "so", "yet", "as", "if", "because", "than", "that",
    "though", "while", "whereas", "whether", // conjunctions
];

/// Extra words ignored when comparing meaning (pronouns, auxiliaries).
const FILLER_WORDS: &[&str] = &[
    "i", "me", "my", "we", "our", "you", "your", "yours", "it", "its", "they", "their",
    "this", "these", "those", "is", "are", "was", "were", "be", "been", "am", "do", "does",
    "did", "can", "will", "just", "not", "no", "more", "most", "what", "how", "why", "who",
];

/// Domain synonyms: variant → canonical token.
const SYNONYMS: &[(&str, &str)] = &[
    ("ads", "ad"),
    ("advert", "ad"),
    ("adverts", "ad"),
    ("advertisement", "ad"),
    ("advertising", "ad"),
    ("creative", "ad"),
    ("creatives", "ad"),
    ("banner", "ad"),
    ("deal", "offer"),
    ("discount", "offer"),
    ("sale", "offer"),
    ("promo", "offer"),
    ("promotion", "offer"),
    ("shop", "buy"),
    ("purchase", "buy"),
    ("order", "buy"),
    ("quick", "fast"),
    ("rapid", "fast"),
    ("speedy", "fast"),
    ("client", "customer"),
    ("buyer", "customer"),
    ("shopper", "customer"),
    ("business", "brand"),
    ("company", "brand"),
    ("grow", "growth"),
    ("scale", "growth"),
];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₩', '₽', '¢', '₺', '₪', '฿'];

// ────────────────────────────────────────────────────────────────────────────
// Tokens
// ────────────────────────────────────────────────────────────────────────────

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Lower-cased word tokens; apostrophes stay inside words ("here's").
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '’').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strips common English inflections. Deliberately light; never shortens below 3 chars.
pub fn stem(token: &str) -> String {
    let t = token
        .strip_suffix("'s")
        .or_else(|| token.strip_suffix("’s"))
        .unwrap_or(token);
    let n = t.chars().count();
    if n > 4 && t.ends_with("ies") {
        return format!("{}y", &t[..t.len() - 3]);
    }
    if n > 5 && t.ends_with("ing") {
        return t[..t.len() - 3].to_string();
    }
    if n > 4 && t.ends_with("ed") {
        return t[..t.len() - 2].to_string();
    }
    if n > 3 && t.ends_with('s') && !t.ends_with("ss") {
        return t[..t.len() - 1].to_string();
    }
    t.to_string()
}

fn synonym(token: &str) -> Option<&'static str> {
    SYNONYMS
        .iter()
        .find(|(variant, _)| *variant == token)
        .map(|(_, canonical)| *canonical)
}

/// Stop-word-filtered, stemmed, synonym-mapped token set used for meaning comparison.
pub fn canonical_tokens(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t) && !FILLER_WORDS.contains(&t.as_str()))
        .map(|t| match synonym(&t) {
            Some(canonical) => canonical.to_string(),
            None => {
                let stemmed = stem(&t);
                synonym(&stemmed).map(str::to_string).unwrap_or(stemmed)
            }
        })
        .collect()
}

/// |A ∩ B| / |A ∪ B|; two empty sets have similarity 0.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

// ────────────────────────────────────────────────────────────────────────────
// Fingerprints
// ────────────────────────────────────────────────────────────────────────────

/// Case- and punctuation-insensitive comparison key.
pub fn normalize_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Character trigrams of the normalized text. Keys shorter than three chars yield
/// themselves as a single gram.
pub fn trigrams(text: &str) -> BTreeSet<String> {
    let key: Vec<char> = normalize_key(text).chars().collect();
    match key.len() {
        0 => BTreeSet::new(),
        1 | 2 => BTreeSet::from([key.iter().collect()]),
        _ => key.windows(3).map(|w| w.iter().collect()).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cleanup
// ────────────────────────────────────────────────────────────────────────────

/// Drops blanks and later duplicates (by `normalize_key`), keeping first occurrences
/// trimmed and in order. Idempotent.
pub fn dedupe_keep_order(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| {
            let key = normalize_key(s);
            !key.is_empty() && seen.insert(key)
        })
        .map(str::to_string)
        .collect()
}

/// Removes digits, currency symbols and percent signs, then tidies the leftover spacing.
pub fn strip_numerals(text: &str) -> String {
    let scrubbed: String = text
        .chars()
        .filter(|c| !(c.is_numeric() || *c == '%' || CURRENCY_SYMBOLS.contains(c)))
        .collect();
    let mut out: Vec<String> = Vec::new();
    for token in scrubbed.split_whitespace() {
        if token.chars().any(char::is_alphanumeric) || matches!(token, "&" | "-" | "–" | "—") {
            out.push(token.to_string());
            continue;
        }
        // Punctuation orphaned by a removed number: keep only a sentence terminator.
        if let (Some(last), Some(end)) = (out.last_mut(), token.chars().rfind(|c| matches!(c, '!' | '?'))) {
            last.push(end);
        }
    }
    out.join(" ")
}

pub fn has_numerals(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_numeric() || c == '%' || CURRENCY_SYMBOLS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tokenize_keeps_contractions() {
        assert_eq!(tokenize("Here's how: Grow FAST!"), vec!["here's", "how", "grow", "fast"]);
    }

    #[test]
    fn test_stem_light_suffixes() {
        assert_eq!(stem("campaigns"), "campaign");
        assert_eq!(stem("launching"), "launch");
        assert_eq!(stem("stories"), "story");
        assert_eq!(stem("class"), "class");
        assert_eq!(stem("bus"), "bus");
    }

    #[test]
    fn test_synonyms_share_canonical_token() {
        let a = canonical_tokens("Better ads for your store");
        let b = canonical_tokens("Better creatives for your store");
        assert_eq!(a, b, "ads and creatives should map to one token");
        assert!(a.contains("ad"));
        assert!(!a.contains("for"), "stop words are filtered");
    }

    #[test]
    fn test_jaccard_bounds() {
        let a = canonical_tokens("fresh bread daily");
        assert!((jaccard(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(jaccard(&a, &canonical_tokens("cold coffee")), 0.0);
        assert_eq!(jaccard::<String>(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }

    #[test]
    fn test_trigrams_ignore_case_and_punctuation() {
        assert_eq!(trigrams("Hello!"), trigrams("hello"));
        assert_eq!(trigrams("abcd").len(), 2);
        assert_eq!(trigrams("ab").len(), 1);
        assert!(trigrams("  ").is_empty());
    }

    #[test]
    fn test_dedupe_is_case_and_punctuation_insensitive() {
        let xs = strings(&["Free shipping", "free shipping!", "  ", "Easy returns"]);
        assert_eq!(dedupe_keep_order(&xs), strings(&["Free shipping", "Easy returns"]));
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let xs = strings(&["B", "a", "b", "A.", "c", " c "]);
        let once = dedupe_keep_order(&xs);
        assert_eq!(dedupe_keep_order(&once), once);
    }

    #[test]
    fn test_strip_numerals() {
        assert_eq!(strip_numerals("Save 50% today"), "Save today");
        assert_eq!(strip_numerals("Only $9.99, now!"), "Only now!");
        assert_eq!(strip_numerals("Join 10,000+ bakers"), "Join bakers");
        assert_eq!(strip_numerals("Save 50%!"), "Save!");
        assert!(!has_numerals(&strip_numerals("Win €5 in 2 days")));
    }
}
