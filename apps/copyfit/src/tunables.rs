//! Tunables — every heuristic constant used by the layout, hygiene, ranking and contrast
//! code, in one place so each can be tuned and tested independently of the algorithms.

// ────────────────────────────────────────────────────────────────────────────
// Wrapping
// ────────────────────────────────────────────────────────────────────────────

/// Slack (px) allowed past the width bound before a line counts as overflowing.
pub const WIDTH_TOLERANCE_PX: f32 = 0.5;

/// Maximum number of line-balancing passes after the greedy wrap.
pub const BALANCE_PASSES: usize = 3;

/// A balancing move is accepted only if the donor line shrinks by at least this much.
pub const BALANCE_MIN_GAIN_PX: f32 = 20.0;

/// Marker appended to a hyphenated line prefix.
pub const HYPHEN_MARKER: char = '-';

/// Neither side of a hyphenation split may be shorter than this (chars).
pub const HYPHEN_MIN_FRAGMENT: usize = 2;

/// Character window searched by the vowel-boundary fallback hyphenator.
pub const FALLBACK_SPLIT_MIN: usize = 6;
pub const FALLBACK_SPLIT_MAX: usize = 8;

/// Words shorter than this are never hyphenated by the fallback heuristic.
pub const FALLBACK_MIN_WORD: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Layout oracle
// ────────────────────────────────────────────────────────────────────────────

/// Single-line areas also try `max(TIGHT_LINE_HEIGHT_FLOOR, declared - TIGHT_LINE_HEIGHT_DELTA)`.
pub const TIGHT_LINE_HEIGHT_DELTA: f32 = 0.06;
pub const TIGHT_LINE_HEIGHT_FLOOR: f32 = 0.94;

/// Most negative letter-spacing (em) the oracle may apply.
pub const DEFAULT_TRACKING_FLOOR: f32 = -0.15;

/// Tracking search step (em).
pub const DEFAULT_TRACKING_STEP: f32 = 0.05;

/// Advisory shortening target reported with an infeasible fit.
pub const COMPRESSION_TARGET: f32 = 0.15;

// ────────────────────────────────────────────────────────────────────────────
// Role schema
// ────────────────────────────────────────────────────────────────────────────

/// Average Latin glyph width at 1em.
pub const AVG_GLYPH_EM: f32 = 0.52;

/// Safety factor applied to the per-area grapheme estimate.
pub const GRAPHEME_BUDGET_FACTOR: f32 = 0.92;

/// Floor for the per-line character estimate.
pub const MIN_CHARS_PER_LINE: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Hygiene
// ────────────────────────────────────────────────────────────────────────────

/// At most this many trailing stop-words are stripped from a headline.
pub const MAX_TRAILING_STOPWORDS: usize = 2;

/// Headlines with fewer tokens are rejected.
pub const MIN_HEADLINE_TOKENS: usize = 3;

pub const COHERENCE_JACCARD_WEIGHT: f32 = 0.6;
pub const COHERENCE_ANSWER_WEIGHT: f32 = 0.4;

// ────────────────────────────────────────────────────────────────────────────
// Single-field ranking
// ────────────────────────────────────────────────────────────────────────────

pub const PENALTY_WEIGHT: f32 = 0.5;
pub const MANY_LINES_THRESHOLD: u32 = 3;
pub const MANY_LINES_PENALTY: f32 = 0.2;
pub const HYPHENATED_PENALTY: f32 = 0.05;

pub const QUALITY_BAD_QUESTION: f32 = 0.15;
pub const QUALITY_TRAILING_STOPWORD: f32 = 0.15;
pub const QUALITY_TOO_SHORT: f32 = 0.3;
pub const QUALITY_GENERIC_VERB: f32 = 0.1;

pub const NOVELTY_WEIGHT: f32 = 0.2;
pub const DEFAULT_MMR_LAMBDA: f32 = 0.75;

// ────────────────────────────────────────────────────────────────────────────
// Bundle ranking
// ────────────────────────────────────────────────────────────────────────────

pub const LOW_RATIO_THRESHOLD: f32 = 0.75;
pub const LOW_RATIO_PENALTY: f32 = 0.40;
pub const SWEET_SPOT_MIN: f32 = 0.90;
pub const SWEET_SPOT_BONUS: f32 = 0.20;
pub const ONE_LINE_BONUS: f32 = 0.10;
pub const TWO_LINE_PENALTY: f32 = 0.04;
pub const MANY_LINE_PENALTY: f32 = 0.08;
pub const WIDTH_LIMITED_PENALTY: f32 = 0.02;

/// Optical deviation beyond this fraction of the target starts costing score.
pub const OPTICAL_DEVIATION_THRESHOLD: f32 = 0.15;
pub const OPTICAL_DEVIATION_SLOPE: f32 = 0.5;
pub const OPTICAL_DEVIATION_MAX: f32 = 0.15;

pub const HEADLINE_WEIGHT: f32 = 0.70;
pub const BODY_WEIGHT: f32 = 0.25;
pub const CTA_WEIGHT: f32 = 0.05;
pub const ANSWER_SHAPE_ADJ: f32 = 0.15;
pub const DUPLICATE_PENALTY: f32 = 0.40;
pub const INSUFFICIENCY_PENALTY: f32 = 0.50;

pub const CTA_REJECT_PENALTY: f32 = 0.25;
pub const COHERENCE_PICK_WEIGHT: f32 = 0.08;

// ────────────────────────────────────────────────────────────────────────────
// Contrast
// ────────────────────────────────────────────────────────────────────────────

/// WCAG AA for normal text.
pub const WCAG_AA: f32 = 4.5;

pub const SCRIM_BASE_OPACITY: f32 = 0.2;
pub const SCRIM_DEFICIT_GAIN: f32 = 0.9;
pub const SCRIM_MAX_OPACITY: f32 = 0.65;
pub const SCRIM_BANDS: usize = 4;

/// Outline stroke width as a fraction of font size.
pub const OUTLINE_WIDTH_RATIO: f32 = 0.04;
pub const OUTLINE_RATIO_BOOST: f32 = 1.5;
