//! Bundle fitting and aggregate selection.
//!
//! # Scoring
//! - Per area: `ratio = font_px / upperBound`, then `−0.40` below 0.75, `+0.20` inside
//!   [0.90, 1.00], `+0.10 / −0.04 / −0.08` for 1 / 2 / ≥3 lines, `−0.02` when
//!   width-limited, minus an optical-deviation penalty past 15% off the cap-height target.
//! - Aggregate: `0.70×headline + 0.25×mean(body-like) + 0.05×cta ± answerShape
//!   − duplicatePenalty − insufficiencyPenalty`.
//! - Final pick among `ok` bundles: `aggregate − 0.25·[CTA not allowed] + 0.08×coherence`.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::hygiene::coherence::answer_shape;
use crate::hygiene::text::normalize_key;
use crate::hygiene::validation::BundleSignals;
use crate::layout::font_metrics::TextMeasurer;
use crate::layout::oracle::{fit_group_uniform_font, fit_text, FitOptions, FitReason, FitReport};
use crate::models::{Area, Bundle, RenderProfile, RoleKind, Template};
use crate::tunables::{
    BODY_WEIGHT, COHERENCE_PICK_WEIGHT, CTA_REJECT_PENALTY, CTA_WEIGHT, DUPLICATE_PENALTY,
    HEADLINE_WEIGHT, INSUFFICIENCY_PENALTY, LOW_RATIO_PENALTY, LOW_RATIO_THRESHOLD,
    MANY_LINE_PENALTY, ONE_LINE_BONUS, OPTICAL_DEVIATION_MAX, OPTICAL_DEVIATION_SLOPE,
    OPTICAL_DEVIATION_THRESHOLD, SWEET_SPOT_BONUS, SWEET_SPOT_MIN, TWO_LINE_PENALTY,
    WIDTH_LIMITED_PENALTY,
};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaFit {
    pub area_id: String,
    pub role: String,
    pub kind: RoleKind,
    pub text: String,
    pub report: FitReport,
    pub score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub headline: Option<f32>,
    pub body_mean: Option<f32>,
    pub cta: Option<f32>,
    pub answer_adjustment: f32,
    pub duplicate_penalty: f32,
    pub insufficiency_penalty: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleFit {
    pub bundle_id: String,
    /// Every present, required role fits.
    pub ok: bool,
    /// Fitted areas, in template order.
    pub areas: Vec<AreaFit>,
    /// Areas left out of the render: optional areas that failed, or areas with no copy.
    pub omitted: Vec<String>,
    /// Required areas whose copy did not fit.
    pub failed: Vec<String>,
    pub breakdown: ScoreBreakdown,
    pub aggregate: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Per-area score
// ────────────────────────────────────────────────────────────────────────────

/// Quality of one successful fit; a failed fit scores 0.
pub fn per_area_score(report: &FitReport, area: &Area) -> f32 {
    let (Some(font_px), Some(lines)) = (report.font_px, report.lines) else {
        return 0.0;
    };
    if !report.fits {
        return 0.0;
    }

    let ratio = font_px as f32 / report.upper_bound_px.max(1) as f32;
    let mut score = ratio;
    if ratio < LOW_RATIO_THRESHOLD {
        score -= LOW_RATIO_PENALTY;
    }
    if (SWEET_SPOT_MIN..=1.0).contains(&ratio) {
        score += SWEET_SPOT_BONUS;
    }
    score += match lines {
        0 | 1 => ONE_LINE_BONUS,
        2 => -TWO_LINE_PENALTY,
        _ => -MANY_LINE_PENALTY,
    };
    if report.has_reason(FitReason::WidthLimited) {
        score -= WIDTH_LIMITED_PENALTY;
    }
    score - optical_deviation_penalty(font_px, area)
}

fn optical_deviation_penalty(font_px: u32, area: &Area) -> f32 {
    let sizing = &area.constraints.font_sizing;
    let Some(optical) = sizing.optical else {
        return 0.0;
    };
    if optical.target_cap_height_px <= 0.0 {
        return 0.0;
    }
    let achieved = font_px as f32 * sizing.cap_height_ratio;
    let deviation = (achieved - optical.target_cap_height_px).abs() / optical.target_cap_height_px;
    if deviation <= OPTICAL_DEVIATION_THRESHOLD {
        return 0.0;
    }
    ((deviation - OPTICAL_DEVIATION_THRESHOLD) * OPTICAL_DEVIATION_SLOPE).min(OPTICAL_DEVIATION_MAX)
}

// ────────────────────────────────────────────────────────────────────────────
// Bundle fit
// ────────────────────────────────────────────────────────────────────────────

/// Fits every role of `bundle` into its template areas and scores the result.
pub fn fit_bundle_all_roles(
    bundle: &Bundle,
    template: &Template,
    profile: &RenderProfile,
    opts: &FitOptions,
    measurer: &dyn TextMeasurer,
) -> BundleFit {
    let mut areas: Vec<AreaFit> = Vec::new();
    let mut omitted = Vec::new();
    let mut failed = Vec::new();
    let mut duplicate_penalty = 0.0;
    let mut insufficiency_penalty = 0.0;

    for role in roles_in_order(template) {
        let role_areas = template.areas_for_role(role);
        let Some(value) = bundle.role(role) else {
            omitted.extend(role_areas.iter().map(|a| a.id.clone()));
            continue;
        };
        let texts: Vec<&str> = value
            .values()
            .into_iter()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();

        if role_areas.len() > 1 {
            let unique: HashSet<String> = texts.iter().map(|t| normalize_key(t)).collect();
            if unique.len() < texts.len() {
                duplicate_penalty = DUPLICATE_PENALTY;
            }
            if unique.len() < role_areas.len() {
                insufficiency_penalty = INSUFFICIENCY_PENALTY;
            }
        }

        let paired = role_areas.len().min(texts.len());
        omitted.extend(role_areas[paired..].iter().map(|a| a.id.clone()));
        let role_areas = &role_areas[..paired];
        let texts = &texts[..paired];

        let reports: Vec<FitReport> = if paired > 1 && role_areas[0].kind == RoleKind::Bullets {
            fit_bullet_group(role_areas, texts, profile, template.canvas_width, opts, measurer)
        } else {
            role_areas
                .iter()
                .zip(texts)
                .map(|(a, t)| fit_text(t, a, profile, template.canvas_width, opts, measurer))
                .collect()
        };

        for ((area, text), report) in role_areas.iter().zip(texts).zip(reports) {
            if report.fits {
                areas.push(AreaFit {
                    area_id: area.id.clone(),
                    role: role.to_string(),
                    kind: area.kind,
                    text: text.to_string(),
                    score: per_area_score(&report, area),
                    report,
                });
            } else if area.optional {
                omitted.push(area.id.clone());
            } else {
                failed.push(area.id.clone());
            }
        }
    }

    let mut breakdown = ScoreBreakdown {
        duplicate_penalty,
        insufficiency_penalty,
        ..ScoreBreakdown::default()
    };
    breakdown.headline = role_score(&areas, |k| k == RoleKind::Headline);
    breakdown.cta = role_score(&areas, |k| k == RoleKind::Cta);
    breakdown.body_mean = body_mean(&areas);
    if let (Some(h), Some(b)) = (
        first_text(&areas, |k| k == RoleKind::Headline),
        first_text(&areas, |k| k == RoleKind::Body)
            .or_else(|| first_text(&areas, |k| k == RoleKind::Subhead))
            .or_else(|| first_text(&areas, |k| k.is_body_like())),
    ) {
        breakdown.answer_adjustment = answer_shape(h, b).aggregate_adjustment();
    }

    let aggregate = HEADLINE_WEIGHT * breakdown.headline.unwrap_or(0.0)
        + BODY_WEIGHT * breakdown.body_mean.unwrap_or(0.0)
        + CTA_WEIGHT * breakdown.cta.unwrap_or(0.0)
        + breakdown.answer_adjustment
        - breakdown.duplicate_penalty
        - breakdown.insufficiency_penalty;

    let ok = failed.is_empty();
    debug!(bundle = %bundle.id, ok, aggregate, fitted = areas.len(), failed = failed.len(), "Bundle fitted");
    BundleFit {
        bundle_id: bundle.id.clone(),
        ok,
        areas,
        omitted,
        failed,
        breakdown,
        aggregate,
    }
}

/// Group fit for a bullets role. Optional members that cannot fit on their own are
/// dropped and the remaining members are re-fitted together; any other group failure
/// fails every member.
fn fit_bullet_group(
    areas: &[&Area],
    texts: &[&str],
    profile: &RenderProfile,
    canvas_width: f32,
    opts: &FitOptions,
    measurer: &dyn TextMeasurer,
) -> Vec<FitReport> {
    let mut reports: Vec<Option<FitReport>> = vec![None; areas.len()];
    let mut live: Vec<usize> = (0..areas.len()).collect();

    loop {
        let live_areas: Vec<&Area> = live.iter().map(|&i| areas[i]).collect();
        let live_texts: Vec<&str> = live.iter().map(|&i| texts[i]).collect();
        let members = match live.len() {
            0 => break,
            1 => vec![fit_text(live_texts[0], live_areas[0], profile, canvas_width, opts, measurer)],
            _ => fit_group_uniform_font(&live_areas, &live_texts, profile, canvas_width, opts, measurer)
                .members,
        };
        if members.iter().all(|m| m.fits) || live.len() == 1 {
            for (&i, report) in live.iter().zip(members) {
                reports[i] = Some(report);
            }
            break;
        }

        let blockers: Vec<(usize, FitReport)> = live
            .iter()
            .map(|&i| (i, fit_text(texts[i], areas[i], profile, canvas_width, opts, measurer)))
            .filter(|(_, alone)| !alone.fits)
            .collect();
        if blockers.is_empty() || blockers.iter().any(|(i, _)| !areas[*i].optional) {
            for (&i, report) in live.iter().zip(members) {
                reports[i] = Some(report);
            }
            break;
        }
        debug!(dropped = blockers.len(), "Dropping optional bullets that cannot fit");
        for (i, alone) in blockers {
            live.retain(|&j| j != i);
            reports[i] = Some(alone);
        }
    }

    reports.into_iter().flatten().collect()
}

fn roles_in_order(template: &Template) -> Vec<&str> {
    let mut roles: Vec<&str> = Vec::new();
    for area in &template.areas {
        if !roles.contains(&area.role.as_str()) {
            roles.push(&area.role);
        }
    }
    roles
}

/// Mean score of the first role whose kind matches.
fn role_score(areas: &[AreaFit], pred: impl Fn(RoleKind) -> bool) -> Option<f32> {
    let role = areas.iter().find(|a| pred(a.kind))?.role.as_str();
    mean(areas.iter().filter(|a| a.role == role).map(|a| a.score))
}

/// Mean over body-like roles of each role's mean area score.
fn body_mean(areas: &[AreaFit]) -> Option<f32> {
    let mut per_role: BTreeMap<&str, Vec<f32>> = BTreeMap::new();
    for a in areas.iter().filter(|a| a.kind.is_body_like()) {
        per_role.entry(a.role.as_str()).or_default().push(a.score);
    }
    mean(per_role.values().filter_map(|s| mean(s.iter().copied())))
}

fn first_text(areas: &[AreaFit], pred: impl Fn(RoleKind) -> bool) -> Option<&str> {
    areas.iter().find(|a| pred(a.kind)).map(|a| a.text.as_str())
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f32)
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregate pick
// ────────────────────────────────────────────────────────────────────────────

/// Pick-time score of one bundle; missing signals count as coherence 0 with an allowed CTA.
pub fn final_score(fit: &BundleFit, signals: &BTreeMap<String, BundleSignals>) -> f32 {
    let mut score = fit.aggregate;
    if let Some(s) = signals.get(&fit.bundle_id) {
        if !s.cta_allowed {
            score -= CTA_REJECT_PENALTY;
        }
        score += COHERENCE_PICK_WEIGHT * s.coherence;
    }
    score
}

/// Best `ok` bundle by final score; `None` if no bundle fits.
pub fn pick_top_bundle_by_aggregate<'a>(
    fits: &'a [BundleFit],
    signals: &BTreeMap<String, BundleSignals>,
) -> Option<&'a BundleFit> {
    let mut best: Option<(&BundleFit, f32)> = None;
    for fit in fits.iter().filter(|f| f.ok) {
        let score = final_score(fit, signals);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((fit, score));
        }
    }
    match best {
        Some((fit, score)) => {
            info!(bundle = %fit.bundle_id, score, candidates = fits.len(), "Picked top bundle");
            Some(fit)
        }
        None => {
            info!(candidates = fits.len(), "No bundle fits the template");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
