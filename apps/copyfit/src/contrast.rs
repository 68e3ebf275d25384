//! Contrast & scrim picker — WCAG text color choice over a sampled background, with a
//! bottom-weighted dark scrim and a glyph outline as escalating fallbacks.
//!
//! # Algorithm
//! 1. Candidates: black, white, brand colors. Highest WCAG contrast ratio wins unless a
//!    color override is forced.
//! 2. Below 4.5:1 with scrim allowed: banded gradient, max opacity
//!    `min(0.65, 0.2 + 0.9 × deficit)`, background luminance darkened by the mean band
//!    opacity, then re-pick (or re-score the override).
//! 3. Still below target and not a CTA: outline of `max(1, round(0.04 × font_px))` px in
//!    the opposite extreme; reported effective ratio is boosted heuristically.

use std::str::FromStr;

use palette::{LinSrgb, Srgb};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{CopyfitError, Result};
use crate::models::RoleKind;
use crate::tunables::{
    OUTLINE_RATIO_BOOST, OUTLINE_WIDTH_RATIO, SCRIM_BANDS, SCRIM_BASE_OPACITY,
    SCRIM_DEFICIT_GAIN, SCRIM_MAX_OPACITY, WCAG_AA,
};

const BLACK: &str = "#000000";
const WHITE: &str = "#FFFFFF";
const MAX_RATIO: f32 = 21.0;

// ────────────────────────────────────────────────────────────────────────────
// Luminance
// ────────────────────────────────────────────────────────────────────────────

/// WCAG relative luminance of an sRGB color.
pub fn relative_luminance(rgb: [u8; 3]) -> f32 {
    let linear: LinSrgb<f32> = Srgb::new(rgb[0], rgb[1], rgb[2])
        .into_format::<f32>()
        .into_linear();
    0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
}

pub fn parse_hex(hex: &str) -> Result<[u8; 3]> {
    let rgb = Srgb::<u8>::from_str(hex.trim())
        .map_err(|_| CopyfitError::InvalidColor(hex.to_string()))?;
    Ok([rgb.red, rgb.green, rgb.blue])
}

pub fn relative_luminance_hex(hex: &str) -> Result<f32> {
    parse_hex(hex).map(relative_luminance)
}

/// Mean relative luminance over sampled background pixels; `None` for no pixels.
pub fn average_luminance(pixels: &[[u8; 3]]) -> Option<f32> {
    if pixels.is_empty() {
        return None;
    }
    let sum: f32 = pixels.iter().map(|p| relative_luminance(*p)).sum();
    Some(sum / pixels.len() as f32)
}

pub fn contrast_ratio(l1: f32, l2: f32) -> f32 {
    let (hi, lo) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (hi + 0.05) / (lo + 0.05)
}

// ────────────────────────────────────────────────────────────────────────────
// Color pick
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPick {
    pub color: String,
    pub ratio: f32,
}

/// Highest-contrast color among black, white and the brand colors. Unparseable brand
/// colors are skipped.
pub fn pick_text_color(bg_luminance: f32, brand_colors: &[String]) -> ColorPick {
    let mut best = ColorPick {
        color: BLACK.to_string(),
        ratio: contrast_ratio(bg_luminance, 0.0),
    };
    let white = contrast_ratio(bg_luminance, 1.0);
    if white > best.ratio {
        best = ColorPick {
            color: WHITE.to_string(),
            ratio: white,
        };
    }
    for hex in brand_colors {
        match relative_luminance_hex(hex) {
            Ok(l) => {
                let ratio = contrast_ratio(bg_luminance, l);
                if ratio > best.ratio {
                    best = ColorPick {
                        color: hex.clone(),
                        ratio,
                    };
                }
            }
            Err(e) => warn!(color = %hex, error = %e, "Skipping unparseable brand color"),
        }
    }
    best
}

// ────────────────────────────────────────────────────────────────────────────
// Legibility plan
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastRequest {
    /// Average relative luminance of the area's background.
    pub bg_luminance: f32,
    #[serde(default)]
    pub brand_colors: Vec<String>,
    /// Forced text color; it is re-scored, never replaced.
    #[serde(default)]
    pub override_color: Option<String>,
    pub allow_scrim: bool,
    pub role_kind: RoleKind,
    pub font_px: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrimBand {
    /// Band start, as a fraction of area height from the top.
    pub offset: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrimPlan {
    pub bands: Vec<ScrimBand>,
    pub max_opacity: f32,
    /// Background luminance estimated under the scrim.
    pub darkened_luminance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlinePlan {
    pub width_px: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastPlan {
    pub color: String,
    /// Measured contrast ratio, after any scrim.
    pub ratio: f32,
    pub scrim: Option<ScrimPlan>,
    pub outline: Option<OutlinePlan>,
    /// `ratio`, boosted when an outline is applied.
    pub effective_ratio: f32,
    pub meets_target: bool,
}

/// Chooses text color, scrim and outline for one area. Errors only on an unparseable
/// override color.
pub fn plan_legible_text(req: &ContrastRequest) -> Result<ContrastPlan> {
    let override_lum = match &req.override_color {
        Some(hex) => Some((hex.clone(), relative_luminance_hex(hex)?)),
        None => None,
    };
    let choose = |bg: f32| match &override_lum {
        Some((hex, l)) => ColorPick {
            color: hex.clone(),
            ratio: contrast_ratio(bg, *l),
        },
        None => pick_text_color(bg, &req.brand_colors),
    };

    let mut pick = choose(req.bg_luminance);
    let mut scrim = None;
    if pick.ratio < WCAG_AA && req.allow_scrim {
        let plan = plan_scrim(req.bg_luminance, pick.ratio);
        pick = choose(plan.darkened_luminance);
        debug!(max_opacity = plan.max_opacity, ratio = pick.ratio, "Scrim applied");
        scrim = Some(plan);
    }

    let mut outline = None;
    let mut effective_ratio = pick.ratio;
    if pick.ratio < WCAG_AA && req.role_kind != RoleKind::Cta {
        let text_lum = relative_luminance_hex(&pick.color).unwrap_or(0.0);
        outline = Some(OutlinePlan {
            width_px: ((OUTLINE_WIDTH_RATIO * req.font_px as f32).round() as u32).max(1),
            color: if text_lum > 0.5 { BLACK } else { WHITE }.to_string(),
        });
        effective_ratio = (pick.ratio * OUTLINE_RATIO_BOOST).min(MAX_RATIO);
    }

    Ok(ContrastPlan {
        meets_target: effective_ratio >= WCAG_AA,
        color: pick.color,
        ratio: pick.ratio,
        scrim,
        outline,
        effective_ratio,
    })
}

/// Bottom-weighted bands, band `i` at `max × (i+1)/n`; the background darkens by the
/// mean band opacity.
fn plan_scrim(bg_luminance: f32, ratio: f32) -> ScrimPlan {
    let deficit = ((WCAG_AA - ratio) / WCAG_AA).clamp(0.0, 1.0);
    let max_opacity = (SCRIM_BASE_OPACITY + SCRIM_DEFICIT_GAIN * deficit).min(SCRIM_MAX_OPACITY);
    let n = SCRIM_BANDS.max(1);
    let bands: Vec<ScrimBand> = (0..n)
        .map(|i| ScrimBand {
            offset: i as f32 / n as f32,
            opacity: max_opacity * (i + 1) as f32 / n as f32,
        })
        .collect();
    let mean_opacity = bands.iter().map(|b| b.opacity).sum::<f32>() / n as f32;
    ScrimPlan {
        bands,
        max_opacity,
        darkened_luminance: bg_luminance * (1.0 - mean_opacity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(bg_luminance: f32) -> ContrastRequest {
        ContrastRequest {
            bg_luminance,
            brand_colors: Vec::new(),
            override_color: None,
            allow_scrim: true,
            role_kind: RoleKind::Headline,
            font_px: 64,
        }
    }

    // ── luminance ───────────────────────────────────────────────────────────

    #[test]
    fn test_luminance_extremes() {
        assert!(relative_luminance([0, 0, 0]).abs() < 1e-6);
        assert!((relative_luminance([255, 255, 255]) - 1.0).abs() < 1e-4);
        let gray = relative_luminance_hex("#AAAAAA").unwrap();
        assert!((gray - 0.402).abs() < 0.005, "got {gray}");
    }

    #[test]
    fn test_invalid_hex_is_error() {
        assert!(matches!(relative_luminance_hex("#GGGGGG"), Err(CopyfitError::InvalidColor(_))));
    }

    #[test]
    fn test_average_luminance() {
        assert_eq!(average_luminance(&[]), None);
        let avg = average_luminance(&[[0, 0, 0], [255, 255, 255]]).unwrap();
        assert!((avg - 0.5).abs() < 1e-3);
    }

    // ── pick ────────────────────────────────────────────────────────────────

    #[test]
    fn test_white_on_black_is_21() {
        let pick = pick_text_color(0.0, &[]);
        assert_eq!(pick.color, WHITE);
        assert!((pick.ratio - 21.0).abs() < 1e-3);
        let plan = plan_legible_text(&request(0.0)).unwrap();
        assert!(plan.scrim.is_none());
        assert!(plan.outline.is_none());
    }

    #[test]
    fn test_pick_at_least_best_of_black_and_white() {
        let brand = vec!["#FF6600".to_string(), "#123456".to_string(), "bogus".to_string()];
        for i in 0..=20 {
            let bg = i as f32 / 20.0;
            let floor = contrast_ratio(bg, 0.0).max(contrast_ratio(bg, 1.0));
            let pick = pick_text_color(bg, &brand);
            assert!(pick.ratio >= floor - 1e-6, "bg {bg}: {} < {floor}", pick.ratio);
        }
    }

    #[test]
    fn test_brand_color_needs_strictly_higher_ratio() {
        // Near-black brand color vs a white background still loses to pure black.
        let pick = pick_text_color(1.0, &["#111111".to_string()]);
        assert_eq!(pick.color, BLACK);
    }

    // ── scrim and outline ───────────────────────────────────────────────────

    #[test]
    fn test_mid_gray_picks_black_without_scrim() {
        let bg = relative_luminance_hex("#AAAAAA").unwrap();
        let plan = plan_legible_text(&request(bg)).unwrap();
        assert_eq!(plan.color, BLACK);
        assert!(plan.ratio > 8.5);
        assert!(plan.scrim.is_none());
    }

    #[test]
    fn test_mid_gray_forced_white_gets_scrim() {
        let bg = relative_luminance_hex("#AAAAAA").unwrap();
        let req = ContrastRequest {
            override_color: Some(WHITE.to_string()),
            role_kind: RoleKind::Cta,
            ..request(bg)
        };
        let plan = plan_legible_text(&req).unwrap();
        let scrim = plan.scrim.as_ref().expect("scrim applied");
        assert_eq!(scrim.bands.len(), 4);
        assert!(scrim.bands.windows(2).all(|w| w[0].opacity < w[1].opacity), "bottom-weighted");
        assert!(scrim.max_opacity <= 0.65);
        assert!(plan.effective_ratio >= 3.0, "got {}", plan.effective_ratio);
        assert!(plan.outline.is_none(), "CTAs never get an outline");
        assert_eq!(plan.color, WHITE);
    }

    #[test]
    fn test_outline_added_for_non_cta_below_target() {
        let bg = relative_luminance_hex("#AAAAAA").unwrap();
        let req = ContrastRequest {
            override_color: Some(WHITE.to_string()),
            ..request(bg)
        };
        let plan = plan_legible_text(&req).unwrap();
        let outline = plan.outline.expect("outline applied");
        assert_eq!(outline.width_px, 3); // round(0.04 * 64)
        assert_eq!(outline.color, BLACK);
        assert!(plan.effective_ratio > plan.ratio);
    }

    #[test]
    fn test_no_scrim_when_disallowed() {
        let req = ContrastRequest {
            override_color: Some(WHITE.to_string()),
            allow_scrim: false,
            ..request(0.8)
        };
        let plan = plan_legible_text(&req).unwrap();
        assert!(plan.scrim.is_none());
        assert!(plan.outline.is_some());
    }
}
