//! Layout Oracle — finds the largest font size at which a text fits an area.
//!
//! # Algorithm
//! - Upper bound per candidate line height: `min(floor(h / (maxLines * lh)),
//!   floor(targetCapHeight / capHeightRatio))`, never below `minFont`.
//! - Binary search over `[minFont, upperBound]`. A size is feasible when the Wrapping
//!   Engine succeeds, the line boxes fit the area height, and some tracking value in
//!   `[trackingFloor, 0]` keeps every line within the area width. Single words that
//!   fail to wrap get one more chance as a single tracked line.
//! - Across line-height scan entries the best candidate wins: larger font, then smaller
//!   `|tracking|`, then fewer lines.
//!
//! The oracle never shortens text. An infeasible fit carries an advisory grapheme target.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::font_metrics::{MemoMeasurer, TextMeasurer};
use crate::layout::wrap::{balanced_wrap, WrapOptions};
use crate::models::{Area, RenderProfile, RoleKind};
use crate::tunables::{
    COMPRESSION_TARGET, DEFAULT_TRACKING_FLOOR, DEFAULT_TRACKING_STEP, TIGHT_LINE_HEIGHT_DELTA,
    TIGHT_LINE_HEIGHT_FLOOR, WIDTH_TOLERANCE_PX,
};

// ────────────────────────────────────────────────────────────────────────────
// Public types
// ────────────────────────────────────────────────────────────────────────────

/// Per-call knobs for the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Line heights to try. `None` = the area's declared line height, plus a tighter one
    /// for single-line areas.
    pub line_height_scan: Option<Vec<f32>>,
    /// Most negative tracking (em) allowed.
    pub tracking_floor: f32,
    pub tracking_step: f32,
    /// Force hyphenation on/off. `None` = allowed except for CTAs and single-line areas.
    pub hyphenate: Option<bool>,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            line_height_scan: None,
            tracking_floor: DEFAULT_TRACKING_FLOOR,
            tracking_step: DEFAULT_TRACKING_STEP,
            hyphenate: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitReason {
    WidthLimited,
    HeightLimited,
    ExceedsMaxLinesAtMinFont,
    EmptyText,
    /// Group fit was given a different number of areas and texts.
    CountMismatch,
}

impl FitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitReason::WidthLimited => "width-limited",
            FitReason::HeightLimited => "height-limited",
            FitReason::ExceedsMaxLinesAtMinFont => "exceeds maxLines at minFont",
            FitReason::EmptyText => "empty-text",
            FitReason::CountMismatch => "count-mismatch",
        }
    }
}

impl std::fmt::Display for FitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of fitting one text into one area. Recomputed per call, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub fits: bool,
    pub font_px: Option<u32>,
    pub lines: Option<u32>,
    pub line_height: Option<f32>,
    pub used_tracking: Option<f32>,
    pub used_hyphenation: Option<bool>,
    pub reasons: Vec<FitReason>,
    pub line_breaks: Vec<String>,
    /// Area upper bound (max over the line-height scan) the fit was searched under.
    pub upper_bound_px: u32,
    /// Advisory: shorten to about this many graphemes. Only set on failure.
    pub suggested_max_graphemes: Option<usize>,
}

impl FitReport {
    pub fn has_reason(&self, reason: FitReason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Result of fitting several texts at one shared font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFitResult {
    pub fits: bool,
    pub font_px: Option<u32>,
    pub members: Vec<FitReport>,
    pub reasons: Vec<FitReason>,
}

// ────────────────────────────────────────────────────────────────────────────
// Bounds
// ────────────────────────────────────────────────────────────────────────────

/// Largest font size geometrically/optically possible for `area` at `line_height`.
pub fn upper_bound_font_px(area: &Area, line_height: f32) -> u32 {
    let sizing = &area.constraints.font_sizing;
    let height_bound = (area.shape.h / (area.max_lines() as f32 * line_height)).floor();
    let bound = match sizing.optical {
        Some(optical) => {
            height_bound.min((optical.target_cap_height_px / sizing.cap_height_ratio).floor())
        }
        None => height_bound,
    };
    (bound.max(0.0) as u32).max(area.constraints.min_font)
}

/// Line heights scanned for `area`.
pub fn line_height_scan(area: &Area, opts: &FitOptions) -> Vec<f32> {
    if let Some(scan) = opts.line_height_scan.as_ref().filter(|s| !s.is_empty()) {
        return scan.clone();
    }
    let declared = area.line_height();
    let mut scan = vec![declared];
    if area.is_single_line() {
        let tight = TIGHT_LINE_HEIGHT_FLOOR.max(declared - TIGHT_LINE_HEIGHT_DELTA);
        if tight < declared {
            scan.push(tight);
        }
    }
    scan
}

/// Upper bound for `area` across its line-height scan.
pub fn area_upper_bound(area: &Area, opts: &FitOptions) -> u32 {
    line_height_scan(area, opts)
        .into_iter()
        .map(|lh| upper_bound_font_px(area, lh))
        .max()
        .unwrap_or(area.constraints.min_font)
}

// ────────────────────────────────────────────────────────────────────────────
// Single-area fit
// ────────────────────────────────────────────────────────────────────────────

/// Fits `text` into `area`, maximizing font size.
pub fn fit_text(
    text: &str,
    area: &Area,
    profile: &RenderProfile,
    canvas_width: f32,
    opts: &FitOptions,
    measurer: &dyn TextMeasurer,
) -> FitReport {
    let probe = Probe::new(text, area, profile, canvas_width, opts, measurer);
    let upper_bound = area_upper_bound(area, opts);

    if probe.text.is_empty() {
        return probe.failure(upper_bound, FitReason::EmptyText);
    }

    let mut best: Option<Candidate> = None;
    for lh in line_height_scan(area, opts) {
        let hi = upper_bound_font_px(area, lh);
        let found = search_max(area.constraints.min_font, hi, |px| probe.try_size(px, lh));
        if let Some(c) = found {
            if best.as_ref().map_or(true, |b| c.beats(b)) {
                best = Some(c);
            }
        }
    }

    match best {
        Some(c) => {
            debug!(
                area = %area.id,
                font_px = c.font_px,
                lines = c.lines.len(),
                tracking = c.tracking,
                measurements = probe.memo.calls(),
                "Fit found"
            );
            probe.success(c, upper_bound)
        }
        None => {
            debug!(area = %area.id, upper_bound, "No feasible font size");
            probe.failure(upper_bound, FitReason::ExceedsMaxLinesAtMinFont)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Multi-area group fit
// ────────────────────────────────────────────────────────────────────────────

/// Fits `texts[i]` into `areas[i]` at one shared font size, for roles whose items must
/// render uniformly (e.g. parallel bullets). The group fails as a whole: if no shared
/// size works, every member is reported as not fitting.
pub fn fit_group_uniform_font(
    areas: &[&Area],
    texts: &[&str],
    profile: &RenderProfile,
    canvas_width: f32,
    opts: &FitOptions,
    measurer: &dyn TextMeasurer,
) -> GroupFitResult {
    if areas.len() != texts.len() {
        debug!(areas = areas.len(), texts = texts.len(), "Group fit given mismatched inputs");
        return GroupFitResult {
            fits: false,
            font_px: None,
            members: Vec::new(),
            reasons: vec![FitReason::CountMismatch],
        };
    }

    let probes: Vec<(Probe<'_>, &Area)> = areas
        .iter()
        .zip(texts.iter())
        .map(|(area, text)| {
            (
                Probe::new(text, area, profile, canvas_width, opts, measurer),
                *area,
            )
        })
        .collect();

    if probes.is_empty() || probes.iter().any(|(p, _)| p.text.is_empty()) {
        return GroupFitResult {
            fits: false,
            font_px: None,
            members: probes
                .iter()
                .map(|(p, a)| p.failure(upper_bound_font_px(a, a.line_height()), FitReason::EmptyText))
                .collect(),
            reasons: vec![FitReason::EmptyText],
        };
    }

    let lo = probes
        .iter()
        .map(|(_, a)| a.constraints.min_font)
        .max()
        .unwrap_or(1);
    let hi = probes
        .iter()
        .map(|(_, a)| upper_bound_font_px(a, a.line_height()))
        .min()
        .unwrap_or(lo)
        .max(lo);

    let found = search_max(lo, hi, |px| {
        probes
            .iter()
            .map(|(p, a)| p.try_size(px, a.line_height()))
            .collect::<Option<Vec<Candidate>>>()
    });

    match found {
        Some(candidates) => {
            let font_px = candidates.first().map(|c| c.font_px);
            let members = probes
                .iter()
                .zip(candidates)
                .map(|((p, a), c)| p.success(c, upper_bound_font_px(a, a.line_height())))
                .collect();
            GroupFitResult {
                fits: true,
                font_px,
                members,
                reasons: Vec::new(),
            }
        }
        None => {
            debug!(members = probes.len(), lo, hi, "Group has no shared feasible font size");
            let members = probes
                .iter()
                .map(|(p, a)| {
                    p.failure(
                        upper_bound_font_px(a, a.line_height()),
                        FitReason::ExceedsMaxLinesAtMinFont,
                    )
                })
                .collect();
            GroupFitResult {
                fits: false,
                font_px: None,
                members,
                reasons: vec![FitReason::ExceedsMaxLinesAtMinFont],
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internals
// ────────────────────────────────────────────────────────────────────────────

/// Binary search for the largest `px` in `[lo, hi]` where `probe` succeeds.
fn search_max<T>(lo: u32, hi: u32, probe: impl Fn(u32) -> Option<T>) -> Option<T> {
    let (mut lo, mut hi) = (lo, hi);
    let mut best = None;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        match probe(mid) {
            Some(found) => {
                best = Some(found);
                lo = mid + 1;
            }
            None => {
                if mid == 0 {
                    break;
                }
                hi = mid - 1;
            }
        }
    }
    best
}

#[derive(Debug, Clone)]
struct Candidate {
    font_px: u32,
    line_height: f32,
    lines: Vec<String>,
    tracking: f32,
    hyphenated: bool,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        if self.font_px != other.font_px {
            return self.font_px > other.font_px;
        }
        if self.tracking.abs() != other.tracking.abs() {
            return self.tracking.abs() < other.tracking.abs();
        }
        self.lines.len() < other.lines.len()
    }
}

/// One text bound to one area's geometry; evaluates candidate font sizes.
struct Probe<'a> {
    text: String,
    memo: MemoMeasurer<'a>,
    width: f32,
    height: f32,
    max_lines: u32,
    wrap: WrapOptions,
    tracking_floor: f32,
    tracking_step: f32,
}

impl<'a> Probe<'a> {
    fn new(
        text: &str,
        area: &Area,
        profile: &RenderProfile,
        canvas_width: f32,
        opts: &FitOptions,
        measurer: &'a dyn TextMeasurer,
    ) -> Self {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut width = area.shape.w;
        if canvas_width > 0.0 && area.shape.x + width > canvas_width {
            width = (canvas_width - area.shape.x).max(0.0);
        }
        let hyphenate = opts
            .hyphenate
            .unwrap_or(area.kind != RoleKind::Cta && !area.is_single_line());

        Probe {
            text: profile.transform_text(&area.role, &normalized),
            memo: MemoMeasurer::new(measurer, profile.font_for(&area.role)),
            width,
            height: area.shape.h,
            max_lines: area.max_lines(),
            wrap: WrapOptions {
                hyphenate,
                locale: profile.locale.clone(),
            },
            tracking_floor: opts.tracking_floor.min(0.0),
            tracking_step: opts.tracking_step.abs().max(0.001),
        }
    }

    fn try_size(&self, px: u32, line_height: f32) -> Option<Candidate> {
        let size = px as f32;
        let wrapped = balanced_wrap(&self.text, self.width, self.max_lines, &self.wrap, |s| {
            self.memo.width(s, size)
        });

        let (lines, hyphenated) = if wrapped.fits {
            (wrapped.lines, wrapped.hyphenated)
        } else if !self.text.contains(' ') && self.max_lines >= 1 {
            // A single word gets one more chance as one tracked line.
            (vec![self.text.clone()], false)
        } else {
            return None;
        };
        if lines.is_empty() {
            return None;
        }

        let total_height = lines.len() as f32 * size * line_height;
        if total_height > self.height + 1e-3 {
            return None;
        }

        let tracking = self.find_tracking(&lines, size)?;
        Some(Candidate {
            font_px: px,
            line_height,
            lines,
            tracking,
            hyphenated,
        })
    }

    /// Tracking closest to zero that keeps every line within the width bound.
    fn find_tracking(&self, lines: &[String], size: f32) -> Option<f32> {
        let steps = (-self.tracking_floor / self.tracking_step).round() as u32;
        (0..=steps)
            .map(|i| 0.0 - i as f32 * self.tracking_step)
            .find(|&t| {
                lines
                    .iter()
                    .all(|l| self.effective_width(l, size, t) <= self.width + WIDTH_TOLERANCE_PX)
            })
    }

    fn effective_width(&self, line: &str, size: f32, tracking: f32) -> f32 {
        let gaps = line.chars().count().saturating_sub(1) as f32;
        self.memo.width(line, size) + tracking * size * gaps
    }

    fn success(&self, c: Candidate, upper_bound: u32) -> FitReport {
        let size = c.font_px as f32;
        let mut reasons = Vec::new();
        let near_width = c.lines.iter().any(|l| {
            self.effective_width(l, size, c.tracking) >= self.width - WIDTH_TOLERANCE_PX
        });
        if c.tracking != 0.0 || near_width {
            reasons.push(FitReason::WidthLimited);
        }
        let total_height = c.lines.len() as f32 * size * c.line_height;
        if total_height >= self.height - WIDTH_TOLERANCE_PX {
            reasons.push(FitReason::HeightLimited);
        }

        FitReport {
            fits: true,
            font_px: Some(c.font_px),
            lines: Some(c.lines.len() as u32),
            line_height: Some(c.line_height),
            used_tracking: Some(c.tracking),
            used_hyphenation: Some(c.hyphenated),
            reasons,
            line_breaks: c.lines,
            upper_bound_px: upper_bound,
            suggested_max_graphemes: None,
        }
    }

    fn failure(&self, upper_bound: u32, reason: FitReason) -> FitReport {
        let graphemes = self.text.chars().count();
        FitReport {
            fits: false,
            font_px: None,
            lines: None,
            line_height: None,
            used_tracking: None,
            used_hyphenation: None,
            reasons: vec![reason],
            line_breaks: Vec::new(),
            upper_bound_px: upper_bound,
            suggested_max_graphemes: (graphemes > 0)
                .then(|| (graphemes as f32 * (1.0 - COMPRESSION_TARGET)).floor() as usize),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{FontSpec, StaticMetrics};
    use crate::models::area::fixtures::{area, with_optical};
    use crate::models::{MaxLines, RoleStyle};

    const CANVAS: f32 = 1080.0;
    const FOX: &str = "A quick brown fox jumps over the lazy dog";

    fn profile() -> RenderProfile {
        RenderProfile::new(FontSpec::default())
    }

    fn hero_area() -> Area {
        with_optical(
            area("h1", "headline", 936.0, 460.0, MaxLines::Range { min: 2, max: 3 }, 32),
            100.0,
        )
    }

    fn single_line_area(w: f32) -> Area {
        let mut a = area("t1", "title", w, 80.0, MaxLines::Fixed(1), 20);
        a.constraints.line_height.value = 1.0;
        a
    }

    fn fit(text: &str, a: &Area) -> FitReport {
        fit_text(text, a, &profile(), CANVAS, &FitOptions::default(), &StaticMetrics)
    }

    // ── bounds ──────────────────────────────────────────────────────────────

    #[test]
    fn test_upper_bound_takes_min_of_height_and_optical() {
        // height: floor(460 / (3 * 1.1)) = 139; optical: floor(100 / 0.7) = 142
        assert_eq!(upper_bound_font_px(&hero_area(), 1.1), 139);
        let low_optical = with_optical(hero_area(), 50.0);
        assert_eq!(upper_bound_font_px(&low_optical, 1.1), 71);
    }

    #[test]
    fn test_upper_bound_never_below_min_font() {
        let tiny = area("x", "body", 200.0, 20.0, MaxLines::Fixed(3), 18);
        assert_eq!(upper_bound_font_px(&tiny, 1.2), 18);
    }

    #[test]
    fn test_single_line_scan_adds_tighter_line_height() {
        let scan = line_height_scan(&single_line_area(300.0), &FitOptions::default());
        assert_eq!(scan.len(), 2);
        assert!((scan[1] - 0.94).abs() < 1e-6);
        assert_eq!(line_height_scan(&hero_area(), &FitOptions::default()), vec![1.1]);
    }

    // ── scenarios ───────────────────────────────────────────────────────────

    #[test]
    fn test_pangram_fits_hero_area_large() {
        let r = fit(FOX, &hero_area());
        assert!(r.fits, "pangram should fit: {r:?}");
        assert!(r.font_px.unwrap() > 60, "font too small: {:?}", r.font_px);
        assert!(r.lines.unwrap() <= 3);
        assert_eq!(r.line_breaks.len() as u32, r.lines.unwrap());
    }

    #[test]
    fn test_repeated_sentence_exceeds_max_lines() {
        let long = format!("{FOX} ").repeat(30);
        let r = fit(&long, &hero_area());
        assert!(!r.fits);
        assert!(
            r.reasons.iter().any(|reason| reason.as_str().contains("exceeds maxLines")),
            "reasons: {:?}",
            r.reasons
        );
        let graphemes = long.trim().chars().count();
        assert!(r.suggested_max_graphemes.unwrap() < graphemes);
    }

    #[test]
    fn test_narrow_single_line_area() {
        let a = single_line_area(300.0);
        let short = fit("Fresh deals", &a);
        assert!(short.fits);
        assert_eq!(short.lines, Some(1));

        let long = fit(
            "Discover the freshest seasonal ingredients delivered to your door every week",
            &a,
        );
        assert!(!long.fits);
    }

    #[test]
    fn test_font_within_bounds_when_min_font_line_fits() {
        let a = hero_area();
        for text in ["Big summer sale", FOX, "Save more every single day"] {
            let r = fit(text, &a);
            assert!(r.fits, "{text} should fit");
            let px = r.font_px.unwrap();
            assert!(px >= 32 && px <= r.upper_bound_px, "{text}: {px} out of range");
        }
    }

    // ── tracking ────────────────────────────────────────────────────────────

    #[test]
    fn test_single_word_rescued_with_negative_tracking() {
        // "Transformational" is 7.55em: 151px at 20px, wider than the 140px area.
        let mut a = single_line_area(140.0);
        a.shape.h = 40.0;
        let r = fit("Transformational", &a);
        assert!(r.fits, "tracking should rescue a single word: {r:?}");
        assert!(r.used_tracking.unwrap() < 0.0);
        assert!(r.used_tracking.unwrap() >= DEFAULT_TRACKING_FLOOR - 1e-4);
        assert!(r.has_reason(FitReason::WidthLimited));
        assert_eq!(r.lines, Some(1));
    }

    #[test]
    fn test_multi_word_not_rescued_by_tracking() {
        let mut a = single_line_area(140.0);
        a.shape.h = 40.0;
        let r = fit("Transform everything", &a);
        assert!(!r.fits);
    }

    // ── profile and geometry ────────────────────────────────────────────────

    #[test]
    fn test_canvas_clamps_overhanging_area() {
        let mut a = single_line_area(400.0);
        a.constraints.min_font = 24;
        assert!(fit("Summer collection", &a).fits);
        a.shape.x = 900.0;
        assert!(!fit("Summer collection", &a).fits, "only 180px remain on canvas");
    }

    #[test]
    fn test_uppercase_profile_applies_to_line_breaks() {
        let mut p = profile();
        p.roles.insert(
            "headline".to_string(),
            RoleStyle {
                uppercase: true,
                ..RoleStyle::default()
            },
        );
        let r = fit_text(FOX, &hero_area(), &p, CANVAS, &FitOptions::default(), &StaticMetrics);
        assert!(r.fits);
        assert!(r.line_breaks.iter().all(|l| l == &l.to_uppercase()));
    }

    #[test]
    fn test_empty_text_never_fits() {
        let r = fit("   ", &hero_area());
        assert!(!r.fits);
        assert!(r.has_reason(FitReason::EmptyText));
    }

    // ── group fit ───────────────────────────────────────────────────────────

    #[test]
    fn test_group_shares_one_font_size() {
        let a = area("b1", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14);
        let b = area("b2", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14);
        let g = fit_group_uniform_font(
            &[&a, &b],
            &["Free shipping", "Cancel anytime online today"],
            &profile(),
            CANVAS,
            &FitOptions::default(),
            &StaticMetrics,
        );
        assert!(g.fits);
        let px = g.font_px.unwrap();
        assert!(g.members.iter().all(|m| m.font_px == Some(px)));

        let alone = fit("Free shipping", &a);
        assert!(px <= alone.font_px.unwrap(), "shared size is bound by the longest item");
    }

    #[test]
    fn test_group_fails_when_any_member_fails() {
        let a = area("b1", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14);
        let b = area("b2", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14);
        let long = "word ".repeat(100);
        let g = fit_group_uniform_font(
            &[&a, &b],
            &["Free shipping", long.as_str()],
            &profile(),
            CANVAS,
            &FitOptions::default(),
            &StaticMetrics,
        );
        assert!(!g.fits);
        assert!(
            g.members.iter().all(|m| !m.fits && m.font_px.is_none()),
            "no member renders when the group fails: {:?}",
            g.members
        );
    }

    #[test]
    fn test_group_rejects_mismatched_inputs() {
        let a = area("b1", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14);
        let b = area("b2", "bullets", 400.0, 60.0, MaxLines::Fixed(1), 14);
        let g = fit_group_uniform_font(
            &[&a, &b],
            &["Free shipping"],
            &profile(),
            CANVAS,
            &FitOptions::default(),
            &StaticMetrics,
        );
        assert!(!g.fits);
        assert!(g.members.is_empty());
        assert_eq!(g.reasons, vec![FitReason::CountMismatch]);
    }

    // ── candidate ordering ──────────────────────────────────────────────────

    fn candidate(font_px: u32, tracking: f32, lines: usize) -> Candidate {
        Candidate {
            font_px,
            line_height: 1.0,
            lines: vec!["x".to_string(); lines],
            tracking,
            hyphenated: false,
        }
    }

    #[test]
    fn test_candidate_prefers_font_then_tracking_then_lines() {
        // Larger font wins even with more tracking and lines.
        assert!(candidate(40, -0.03, 3).beats(&candidate(39, 0.0, 1)));
        // Same font: tracking closer to zero wins even with more lines.
        assert!(candidate(40, -0.01, 3).beats(&candidate(40, -0.02, 1)));
        assert!(!candidate(40, -0.02, 1).beats(&candidate(40, -0.01, 3)));
        // Same font and tracking: fewer lines wins.
        assert!(candidate(40, 0.0, 1).beats(&candidate(40, 0.0, 2)));
        assert!(!candidate(40, 0.0, 2).beats(&candidate(40, 0.0, 2)));
    }

    #[test]
    fn test_tight_line_height_lifts_height_bound_single_line() {
        // Declared 1.0 at h=60: the declared line height caps the font at 60px; the
        // tight 0.94 line height allows floor(60 / 0.94) = 63px.
        let mut a = single_line_area(1000.0);
        a.shape.h = 60.0;
        assert_eq!(upper_bound_font_px(&a, 1.0), 60);

        let r = fit("Sale", &a);
        assert!(r.fits);
        assert_eq!(r.line_height, Some(0.94));
        assert!(r.font_px.unwrap() > 60, "tight line height should allow more: {r:?}");
        assert_eq!(r.upper_bound_px, 63);
    }
}
