//! Wrapping Engine — script-aware greedy line breaking with hyphenation and balancing.
//!
//! # Algorithm
//! 1. Normalize whitespace and detect the dominant script.
//! 2. CJK text wraps per character; everything else wraps per space-delimited word.
//! 3. A word that cannot start a fresh line is hyphenated (when allowed): the longest
//!    prefix that fits with a trailing marker becomes a line and the remainder is
//!    re-queued as the next word.
//! 4. After a successful greedy pass, up to `BALANCE_PASSES` passes move the last token
//!    of a line down to the next line when that shortens the donor by at least
//!    `BALANCE_MIN_GAIN_PX`.
//! 5. Every line is re-measured before success is reported.
//!
//! Widths come from a caller-supplied closure, so the engine is agnostic to fonts and
//! sizes; the layout oracle binds a memoized measurer at a fixed size.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::layout::hyphenate::break_points;
use crate::tunables::{BALANCE_MIN_GAIN_PX, BALANCE_PASSES, HYPHEN_MARKER, WIDTH_TOLERANCE_PX};

// ────────────────────────────────────────────────────────────────────────────
// Script detection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Script {
    Latin,
    Cyrillic,
    Arabic,
    Hebrew,
    Cjk,
}

/// True for Han ideographs, kana, Hangul and full-width forms.
pub fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF      // Hiragana + Katakana
        | 0x3400..=0x4DBF    // CJK Extension A
        | 0x4E00..=0x9FFF    // CJK Unified Ideographs
        | 0xAC00..=0xD7AF    // Hangul syllables
        | 0xF900..=0xFAFF    // CJK Compatibility Ideographs
        | 0xFF00..=0xFFEF    // Half/full-width forms
        | 0x3000..=0x303F    // CJK punctuation
    )
}

fn script_of(c: char) -> Option<Script> {
    let code = c as u32;
    if is_cjk(c) {
        Some(Script::Cjk)
    } else if (0x0400..=0x04FF).contains(&code) || (0x0500..=0x052F).contains(&code) {
        Some(Script::Cyrillic)
    } else if (0x0600..=0x06FF).contains(&code) || (0x0750..=0x077F).contains(&code) {
        Some(Script::Arabic)
    } else if (0x0590..=0x05FF).contains(&code) {
        Some(Script::Hebrew)
    } else if c.is_alphabetic() {
        Some(Script::Latin)
    } else {
        None
    }
}

/// Dominant script of `text` by letter count; Latin when there are no letters.
pub fn detect_script(text: &str) -> Script {
    let mut counts = [0usize; 5];
    for script in text.chars().filter_map(script_of) {
        counts[script as usize] += 1;
    }
    const ORDER: [Script; 5] = [
        Script::Latin,
        Script::Cyrillic,
        Script::Arabic,
        Script::Hebrew,
        Script::Cjk,
    ];
    ORDER
        .iter()
        .copied()
        .max_by_key(|s| (counts[*s as usize], std::cmp::Reverse(*s as usize)))
        .filter(|s| counts[*s as usize] > 0)
        .unwrap_or(Script::Latin)
}

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WrapOptions {
    pub hyphenate: bool,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapResult {
    pub fits: bool,
    /// Rendered lines. On failure, the lines placed before the failure (diagnostic only).
    pub lines: Vec<String>,
    /// True if at least one word was split with a hyphen.
    pub hyphenated: bool,
}

impl WrapResult {
    fn failed(lines: &[Line], joiner: &str) -> Self {
        WrapResult {
            fits: false,
            lines: lines.iter().map(|l| l.render(joiner)).collect(),
            hyphenated: lines.iter().any(|l| l.hyphen_break),
        }
    }
}

#[derive(Debug, Clone)]
struct Line {
    tokens: Vec<String>,
    /// The line ends in a hyphenated word fragment; its last token must stay put.
    hyphen_break: bool,
}

impl Line {
    fn render(&self, joiner: &str) -> String {
        self.tokens.join(joiner).trim().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Breaks `text` into at most `max_lines` lines no wider than `max_width` (+0.5px).
pub fn balanced_wrap<F>(
    text: &str,
    max_width: f32,
    max_lines: u32,
    opts: &WrapOptions,
    measure: F,
) -> WrapResult
where
    F: Fn(&str) -> f32,
{
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return WrapResult {
            fits: true,
            lines: Vec::new(),
            hyphenated: false,
        };
    }

    let limit = max_width + WIDTH_TOLERANCE_PX;
    let max_lines = max_lines as usize;

    let (greedy, joiner) = match detect_script(&normalized) {
        Script::Cjk => (wrap_chars(&normalized, limit, max_lines, &measure), ""),
        _ => (
            wrap_words(&normalized, limit, max_lines, opts, &measure),
            " ",
        ),
    };
    let mut lines = match greedy {
        Ok(lines) => lines,
        Err(partial) => return WrapResult::failed(&partial, joiner),
    };

    balance(&mut lines, joiner, limit, &measure);

    if lines
        .iter()
        .any(|l| measure(&l.render(joiner)) > limit)
    {
        return WrapResult::failed(&lines, joiner);
    }

    WrapResult {
        fits: true,
        hyphenated: lines.iter().any(|l| l.hyphen_break),
        lines: lines.iter().map(|l| l.render(joiner)).collect(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Greedy passes
// ────────────────────────────────────────────────────────────────────────────

fn wrap_words<F>(
    text: &str,
    limit: f32,
    max_lines: usize,
    opts: &WrapOptions,
    measure: &F,
) -> Result<Vec<Line>, Vec<Line>>
where
    F: Fn(&str) -> f32,
{
    let mut queue: VecDeque<String> = text.split(' ').map(str::to_string).collect();
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    while let Some(word) = queue.pop_front() {
        // The word would start line `lines.len() + 1`.
        if lines.len() >= max_lines {
            return Err(lines);
        }

        let mut candidate = current.clone();
        candidate.push(word.clone());
        if measure(&candidate.join(" ")) <= limit {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(Line {
                tokens: std::mem::take(&mut current),
                hyphen_break: false,
            });
            queue.push_front(word);
            continue;
        }

        // The word does not fit even on a fresh line.
        if !opts.hyphenate {
            return Err(lines);
        }
        match split_to_fit(&word, limit, opts.locale.as_deref(), measure) {
            Some((prefix, rest)) => {
                lines.push(Line {
                    tokens: vec![prefix],
                    hyphen_break: true,
                });
                queue.push_front(rest);
            }
            None => return Err(lines),
        }
    }

    if !current.is_empty() {
        lines.push(Line {
            tokens: current,
            hyphen_break: false,
        });
    }
    Ok(lines)
}

/// Longest hyphenated prefix of `word` that fits within `limit`, with the remainder.
fn split_to_fit<F>(word: &str, limit: f32, locale: Option<&str>, measure: &F) -> Option<(String, String)>
where
    F: Fn(&str) -> f32,
{
    let chars: Vec<char> = word.chars().collect();
    break_points(word, locale).into_iter().rev().find_map(|at| {
        let mut prefix: String = chars[..at].iter().collect();
        prefix.push(HYPHEN_MARKER);
        if measure(&prefix) <= limit {
            Some((prefix, chars[at..].iter().collect()))
        } else {
            None
        }
    })
}

fn wrap_chars<F>(text: &str, limit: f32, max_lines: usize, measure: &F) -> Result<Vec<Line>, Vec<Line>>
where
    F: Fn(&str) -> f32,
{
    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for ch in text.chars() {
        if current.is_empty() && ch == ' ' {
            continue;
        }
        let mut candidate: String = current.concat();
        candidate.push(ch);
        if measure(candidate.trim_end()) <= limit {
            current.push(ch.to_string());
            continue;
        }
        if current.is_empty() {
            return Err(lines);
        }
        lines.push(Line {
            tokens: std::mem::take(&mut current),
            hyphen_break: false,
        });
        if lines.len() >= max_lines {
            return Err(lines);
        }
        if ch != ' ' {
            if measure(&ch.to_string()) > limit {
                return Err(lines);
            }
            current.push(ch.to_string());
        }
    }

    if !current.is_empty() {
        if lines.len() >= max_lines {
            return Err(lines);
        }
        lines.push(Line {
            tokens: current,
            hyphen_break: false,
        });
    }
    Ok(lines)
}

// ────────────────────────────────────────────────────────────────────────────
// Balancing
// ────────────────────────────────────────────────────────────────────────────

/// Moves trailing tokens down to the following line where that shortens the donor line
/// by at least `BALANCE_MIN_GAIN_PX`, the receiver still fits, and the receiver does
/// not end up wider than the donor was.
fn balance<F>(lines: &mut [Line], joiner: &str, limit: f32, measure: &F)
where
    F: Fn(&str) -> f32,
{
    for _ in 0..BALANCE_PASSES {
        let mut moved = false;
        for i in 0..lines.len().saturating_sub(1) {
            let donor = &lines[i];
            if donor.hyphen_break || donor.tokens.len() < 2 {
                continue;
            }
            let before = measure(&donor.render(joiner));

            let (kept, last) = donor.tokens.split_at(donor.tokens.len() - 1);
            let kept_line = Line {
                tokens: kept.to_vec(),
                hyphen_break: false,
            };
            let mut receiver_tokens = last.to_vec();
            receiver_tokens.extend(lines[i + 1].tokens.iter().cloned());
            let receiver_line = Line {
                tokens: receiver_tokens,
                hyphen_break: lines[i + 1].hyphen_break,
            };

            let donor_after = measure(&kept_line.render(joiner));
            let receiver_after = measure(&receiver_line.render(joiner));
            if receiver_after <= limit
                && before - donor_after >= BALANCE_MIN_GAIN_PX
                && receiver_after <= before
            {
                lines[i] = kept_line;
                lines[i + 1] = receiver_line;
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
