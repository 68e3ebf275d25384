//! Hyphenation break points — locale dictionaries from `hypher`, with a deterministic
//! vowel-boundary fallback for locales that have no dictionary.

use std::sync::Once;

use hypher::Lang;
use tracing::warn;

use crate::tunables::{
    FALLBACK_MIN_WORD, FALLBACK_SPLIT_MAX, FALLBACK_SPLIT_MIN, HYPHEN_MIN_FRAGMENT,
};

static FALLBACK_NOTICE: Once = Once::new();

/// Returns the allowed break positions of `word`, as ascending prefix lengths in chars.
///
/// Leading/trailing punctuation is never split; every fragment keeps at least
/// `HYPHEN_MIN_FRAGMENT` chars of the word core.
pub fn break_points(word: &str, locale: Option<&str>) -> Vec<usize> {
    let chars: Vec<char> = word.chars().collect();
    let lead = chars.iter().take_while(|c| !c.is_alphabetic()).count();
    let trail = chars.iter().rev().take_while(|c| !c.is_alphabetic()).count();
    if lead + trail >= chars.len() {
        return Vec::new();
    }
    let core: Vec<char> = chars[lead..chars.len() - trail].to_vec();

    let breaks = match locale.and_then(dictionary_for) {
        Some(lang) => dictionary_breaks(&core, lang),
        None => {
            FALLBACK_NOTICE.call_once(|| {
                warn!(
                    locale = locale.unwrap_or("none"),
                    "No hyphenation dictionary for locale; using vowel-boundary fallback"
                );
            });
            vowel_boundary_breaks(&core)
        }
    };

    breaks
        .into_iter()
        .filter(|&b| b >= HYPHEN_MIN_FRAGMENT && b + HYPHEN_MIN_FRAGMENT <= core.len())
        .map(|b| b + lead)
        .collect()
}

/// Maps a locale tag ("en", "de-DE", "pt_BR") to a dictionary by its ISO-639-1 prefix.
fn dictionary_for(locale: &str) -> Option<Lang> {
    let bytes: Vec<u8> = locale
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_lowercase())
        .collect();
    if bytes.len() != 2 {
        return None;
    }
    Lang::from_iso([bytes[0], bytes[1]])
}

fn dictionary_breaks(core: &[char], lang: Lang) -> Vec<usize> {
    let original: String = core.iter().collect();
    let lower = original.to_lowercase();
    // Case mapping may change the char count (e.g. 'İ'); positions would not line up.
    if lower.chars().count() != core.len() {
        return Vec::new();
    }

    let mut breaks = Vec::new();
    let mut consumed = 0usize;
    let syllables: Vec<&str> = hypher::hyphenate(&lower, lang).collect();
    for syllable in syllables.iter().take(syllables.len().saturating_sub(1)) {
        consumed += syllable.chars().count();
        breaks.push(consumed);
    }
    breaks
}

/// Splits after a vowel followed by a consonant, searching chars 6..=8; if no such
/// boundary exists the word is split at the middle of the window.
fn vowel_boundary_breaks(core: &[char]) -> Vec<usize> {
    let len = core.len();
    if len < FALLBACK_MIN_WORD {
        return Vec::new();
    }
    let upper = FALLBACK_SPLIT_MAX.min(len - HYPHEN_MIN_FRAGMENT);
    let found: Vec<usize> = (FALLBACK_SPLIT_MIN..=upper)
        .filter(|&p| is_vowel(core[p - 1]) && core[p].is_alphabetic() && !is_vowel(core[p]))
        .collect();
    if !found.is_empty() {
        return found;
    }
    let mid = (FALLBACK_SPLIT_MIN + FALLBACK_SPLIT_MAX) / 2;
    vec![mid.clamp(HYPHEN_MIN_FRAGMENT, len - HYPHEN_MIN_FRAGMENT)]
}

fn is_vowel(c: char) -> bool {
    c.to_lowercase()
        .any(|l| "aeiouyàáâäãåæèéêëìíîïòóôöõøùúûüаеёиоуыэюя".contains(l))
}
