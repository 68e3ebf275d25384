//! Text measurement — the provider seam the layout oracle measures through, plus a
//! built-in static-table provider.
//!
//! Character widths are in em units (relative to font size). Static tables are an
//! approximation of real glyph advances; they are accurate enough to rank fits and to
//! run the layout oracle without a rasterizer. Production callers plug a shaping
//! backend in through `TextMeasurer`.
//!
//! The base table covers ASCII 0x20..=0x7E (95 printable characters), index =
//! `(char as usize) - 32`. Other families are the base table scaled by a per-family
//! width factor.

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layout::wrap::is_cjk;
use crate::tunables::AVG_GLYPH_EM;

// ────────────────────────────────────────────────────────────────────────────
// Font identity
// ────────────────────────────────────────────────────────────────────────────

/// Font families shipped with the built-in metric table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    /// Humanist sans-serif; the base table.
    #[default]
    Inter,
    /// Geometric sans-serif, slightly wider than Inter.
    Lato,
    /// Condensed display sans-serif.
    Oswald,
    /// Old-style serif.
    EbGaramond,
}

impl FontFamily {
    /// Average advance relative to the Inter base table.
    fn width_scale(&self) -> f32 {
        match self {
            FontFamily::Inter => 1.0,
            FontFamily::Lato => 1.05,
            FontFamily::Oswald => 0.68,
            FontFamily::EbGaramond => 0.85,
        }
    }
}

/// Family + weight, the font identity passed to a measurement provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: FontFamily,
    #[serde(default = "default_weight")]
    pub weight: u16,
}

fn default_weight() -> u16 {
    400
}

impl FontSpec {
    pub fn new(family: FontFamily, weight: u16) -> Self {
        FontSpec { family, weight }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec::new(FontFamily::Inter, default_weight())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider seam
// ────────────────────────────────────────────────────────────────────────────

/// Measures rendered text width in pixels.
///
/// Implementations may call into a blocking rendering backend; the oracle wraps them
/// in a `MemoMeasurer` for the duration of a single fit.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec, size_px: f32) -> f32;
}

/// Memoizes `(text, size)` → width for one font over the lifetime of one fit.
pub struct MemoMeasurer<'a> {
    inner: &'a dyn TextMeasurer,
    font: FontSpec,
    cache: RefCell<HashMap<(String, u32), f32>>,
}

impl<'a> MemoMeasurer<'a> {
    pub fn new(inner: &'a dyn TextMeasurer, font: FontSpec) -> Self {
        MemoMeasurer {
            inner,
            font,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn width(&self, text: &str, size_px: f32) -> f32 {
        let key = (text.to_string(), size_px.to_bits());
        if let Some(&w) = self.cache.borrow().get(&key) {
            return w;
        }
        let w = self.inner.measure(text, &self.font, size_px);
        self.cache.borrow_mut().insert(key, w);
        w
    }

    /// Number of distinct measurements taken so far.
    pub fn calls(&self) -> usize {
        self.cache.borrow().len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static-table provider
// ────────────────────────────────────────────────────────────────────────────

/// Bold weights render this much wider than regular.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

/// Built-in measurement provider backed by a static em-width table.
///
/// Non-ASCII characters fall back to the average glyph width; CJK ideographs and
/// kana are one full em.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMetrics;

impl StaticMetrics {
    /// Width of `s` in em units for `font`.
    pub fn measure_em(&self, s: &str, font: &FontSpec) -> f32 {
        let base: f32 = s.chars().map(char_em).sum();
        let weight = if font.weight >= 600 {
            BOLD_WIDTH_FACTOR
        } else {
            1.0
        };
        base * font.family.width_scale() * weight
    }
}

impl TextMeasurer for StaticMetrics {
    fn measure(&self, text: &str, font: &FontSpec, size_px: f32) -> f32 {
        self.measure_em(text, font) * size_px
    }
}

fn char_em(c: char) -> f32 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        BASE_WIDTHS[code - 32]
    } else if is_cjk(c) {
        1.0
    } else if c == '\u{00AD}' || c == '\u{200B}' {
        0.0
    } else {
        AVG_GLYPH_EM
    }
}

/// Inter advances at 1em.
#[rustfmt::skip]
static BASE_WIDTHS: [f32; 95] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
    0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
    // 0     1     2     3     4     5     6     7     8     9
    0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
    // :     ;     <     =     >     ?     @
    0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
    // A     B     C     D     E     F     G     H     I     J     K     L     M
    0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
    // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
    0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
    // [     \     ]     ^     _     `
    0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
    // a     b     c     d     e     f     g     h     i     j     k     l     m
    0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
    // n     o     p     q     r     s     t     u     v     w     x     y     z
    0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
    // {     |     }     ~
    0.33, 0.26, 0.33, 0.59,
];

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn inter() -> FontSpec {
        FontSpec::default()
    }

    #[test]
    fn test_measure_empty_returns_zero() {
        assert_eq!(StaticMetrics.measure("", &inter(), 40.0), 0.0);
    }

    #[test]
    fn test_measure_scales_with_size() {
        // "Rust" = R(0.61) + u(0.56) + s(0.44) + t(0.39) = 2.00em
        let w = StaticMetrics.measure("Rust", &inter(), 10.0);
        assert!((w - 20.0).abs() < 1e-3, "Rust at 10px should be ~20px, got {w}");
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let w = StaticMetrics.measure_em("é", &inter());
        assert!((w - AVG_GLYPH_EM).abs() < 1e-4);
    }

    #[test]
    fn test_cjk_is_full_em() {
        let w = StaticMetrics.measure_em("你好", &inter());
        assert!((w - 2.0).abs() < 1e-4, "two ideographs should be 2em, got {w}");
    }

    #[test]
    fn test_condensed_family_narrower() {
        let text = "Fresh seasonal boxes";
        let oswald = StaticMetrics.measure_em(text, &FontSpec::new(FontFamily::Oswald, 400));
        let lato = StaticMetrics.measure_em(text, &FontSpec::new(FontFamily::Lato, 400));
        assert!(oswald < lato, "Oswald should measure narrower than Lato");
    }

    #[test]
    fn test_bold_wider_than_regular() {
        let regular = StaticMetrics.measure_em("Shop now", &FontSpec::new(FontFamily::Inter, 400));
        let bold = StaticMetrics.measure_em("Shop now", &FontSpec::new(FontFamily::Inter, 700));
        assert!(bold > regular);
    }

    #[test]
    fn test_memo_measurer_caches_repeat_calls() {
        let memo = MemoMeasurer::new(&StaticMetrics, inter());
        let a = memo.width("hello", 32.0);
        let b = memo.width("hello", 32.0);
        let _ = memo.width("hello", 33.0);
        assert_eq!(a, b);
        assert_eq!(memo.calls(), 2, "same (text, size) must hit the cache");
    }
}
