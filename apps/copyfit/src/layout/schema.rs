//! Role schema — one entry per distinct template role, telling copy generation how much
//! text each role can hold.
//!
//! # Algorithm
//! - Group areas by role in first-appearance order.
//! - `maxLines`: largest line limit in the group.
//! - `upperBoundFontPx`: largest per-area upper bound (see `oracle::area_upper_bound`).
//! - `graphemeBudget`: smallest per-area estimate of
//!   `floor(max(6, floor(w / (0.52 * ub))) * maxLines * 0.92)`.

use serde::{Deserialize, Serialize};

use crate::layout::oracle::{area_upper_bound, FitOptions};
use crate::models::{Area, RoleKind, Template};
use crate::tunables::{AVG_GLYPH_EM, GRAPHEME_BUDGET_FACTOR, MIN_CHARS_PER_LINE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    pub role: String,
    pub kind: RoleKind,
    /// Number of areas carrying this role (bullets etc. have several).
    pub count: usize,
    pub max_lines: u32,
    pub line_height: f32,
    pub width_px: f32,
    pub height_px: f32,
    pub upper_bound_font_px: u32,
    pub grapheme_budget: usize,
    pub single_line: bool,
    pub hyphenate: bool,
}

impl RoleSpec {
    pub fn is_multi(&self) -> bool {
        self.count > 1
    }
}

/// Derives one `RoleSpec` per distinct role of `template`.
pub fn derive_role_schema(template: &Template) -> Vec<RoleSpec> {
    let opts = FitOptions::default();
    let mut roles: Vec<&str> = Vec::new();
    for area in &template.areas {
        if !roles.contains(&area.role.as_str()) {
            roles.push(&area.role);
        }
    }

    roles
        .into_iter()
        .filter_map(|role| {
            let group = template.areas_for_role(role);
            let first = group.first()?;
            let max_lines = group.iter().map(|a| a.max_lines()).max().unwrap_or(1);
            let upper_bound = group
                .iter()
                .map(|a| area_upper_bound(a, &opts))
                .max()
                .unwrap_or(first.constraints.min_font);
            let budget = group
                .iter()
                .map(|a| grapheme_budget(a, area_upper_bound(a, &opts)))
                .min()
                .unwrap_or(0);
            let single_line = max_lines == 1;

            Some(RoleSpec {
                role: role.to_string(),
                kind: first.kind,
                count: group.len(),
                max_lines,
                line_height: first.line_height(),
                width_px: first.shape.w,
                height_px: first.shape.h,
                upper_bound_font_px: upper_bound,
                grapheme_budget: budget,
                single_line,
                hyphenate: first.kind != RoleKind::Cta && !single_line,
            })
        })
        .collect()
}

fn grapheme_budget(area: &Area, upper_bound: u32) -> usize {
    let per_line = (area.shape.w / (AVG_GLYPH_EM * upper_bound.max(1) as f32)).floor() as usize;
    let per_line = per_line.max(MIN_CHARS_PER_LINE);
    (per_line as f32 * area.max_lines() as f32 * GRAPHEME_BUDGET_FACTOR).floor() as usize
}
