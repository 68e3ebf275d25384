//! Kind-specific post-processing for meme, review and insight roles.
//!
//! - collapse to one line, strip emoji and hashtags;
//! - negative memes state the pain only: an embedded solution clause is cut, unless the
//!   cut would leave fewer words than the kind's minimum (then the line is kept and noted);
//! - bare verbs (`get`, `use`, `try`, `fix`, `meet`) only open a solution clause right after
//!   a separator or `so` / `just` / `now`;
//! - word-count bounds: over the maximum is truncated, under the minimum is rejected.

use std::sync::OnceLock;

use regex::Regex;

use crate::hygiene::text::is_stop_word;
use crate::models::role::MemeVariant;
use crate::models::RoleKind;

fn solution_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:so you can|now you can|thanks to|switch to|with our|introducing|that's why|that’s why|until you|but now|just use)\b|(?:[,;:—–-]\s*|\b(?:so|just|now)\s+)(?:try|use|get|meet|fix)\b",
        )
        .expect("valid regex")
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindOutcome {
    /// Unchanged apart from whitespace/emoji cleanup.
    Clean(String),
    /// Usable, but content was cut.
    Adjusted { text: String, note: String },
    Rejected(String),
}

impl KindOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            KindOutcome::Clean(t) | KindOutcome::Adjusted { text: t, .. } => Some(t),
            KindOutcome::Rejected(_) => None,
        }
    }
}

pub fn post_process_kind(kind: RoleKind, text: &str) -> KindOutcome {
    if !kind.is_one_liner_kind() {
        return KindOutcome::Clean(text.trim().to_string());
    }

    let mut line = strip_decorations(text);
    let mut notes = Vec::new();

    if kind == RoleKind::Meme(MemeVariant::Negative) {
        if let Some(cut) = cut_solution_clause(&line) {
            let min_words = kind.word_bounds().map_or(0, |(min, _)| min);
            if cut.split_whitespace().count() >= min_words {
                notes.push(format!("solution clause removed: '{}'", &line[cut.len()..].trim()));
                line = cut;
            } else {
                notes.push(format!("possible solution clause kept: cutting would leave '{cut}'"));
            }
        }
    }

    if let Some((min, max)) = kind.word_bounds() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() < min {
            return KindOutcome::Rejected(format!(
                "{} words, at least {min} required",
                words.len()
            ));
        }
        if words.len() > max {
            notes.push(format!("truncated from {} to {max} words", words.len()));
            line = trim_dangling(&words[..max].join(" "));
        }
    }

    if notes.is_empty() {
        KindOutcome::Clean(line)
    } else {
        KindOutcome::Adjusted {
            text: line,
            note: notes.join("; "),
        }
    }
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F300..=0x1FAFF | 0x2600..=0x27BF | 0x1F1E6..=0x1F1FF | 0xFE0F | 0x200D | 0x2B50 | 0x2B55)
}

/// One line, no emoji, no hashtags, single spaces.
fn strip_decorations(text: &str) -> String {
    let no_emoji: String = text.chars().filter(|c| !is_emoji(*c)).collect();
    no_emoji
        .split_whitespace()
        .filter(|w| !w.starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text before the first resolving clause, if one starts after the opening word.
fn cut_solution_clause(line: &str) -> Option<String> {
    let m = solution_clause_re().find_iter(line).find(|m| m.start() > 0)?;
    let head = trim_dangling(&line[..m.start()]);
    (!head.is_empty()).then_some(head)
}

/// Drops trailing separators and dangling conjunctions/prepositions.
fn trim_dangling(text: &str) -> String {
    let mut words: Vec<&str> = text.split_whitespace().collect();
    loop {
        let Some(last) = words.last() else { break };
        let bare: String = last
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if bare.is_empty() || is_stop_word(&bare) {
            words.pop();
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':' | '-' | '–' | '—'))
        .to_string()
}
