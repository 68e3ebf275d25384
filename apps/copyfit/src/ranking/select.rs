//! Single-field selection — picks the top `k` fitted candidates for one role.
//!
//! # Algorithm
//! 1. Base score = `ln(1+font_px) − 0.5×penalties − 0.2·[lines>3] − 0.05·[hyphenated]
//!    − textQualityPenalty(text)`.
//! 2. Novelty: subtract `0.2 × |trigrams ∩ stored| / |trigrams|` when a key is given.
//! 3. Diversity pool of `min(2k, n)` by Maximal Marginal Relevance over trigram Jaccard.
//! 4. Angle quotas: satisfy per-angle minimums (`ceil(minPct·k)`) in pool order, never
//!    exceeding `ceil(maxPct·k)` per angle, then fill the remaining slots.
//! 5. Merge the selection's trigrams back into the novelty store.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hygiene::headline::text_quality_penalty;
use crate::hygiene::text::{jaccard, trigrams};
use crate::layout::oracle::FitReport;
use crate::ranking::novelty::{NoveltyKey, NoveltyStore};
use crate::tunables::{
    DEFAULT_MMR_LAMBDA, HYPHENATED_PENALTY, MANY_LINES_PENALTY, MANY_LINES_THRESHOLD,
    NOVELTY_WEIGHT, PENALTY_WEIGHT,
};

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// A fitted text candidate for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub angle: String,
    pub font_px: u32,
    pub lines: u32,
    #[serde(default)]
    pub hyphenated: bool,
    /// Count of layout penalties (limiting reasons) carried by the fit.
    #[serde(default)]
    pub penalties: f32,
}

impl FieldCandidate {
    /// Builds a candidate from a successful fit; `None` if the text did not fit.
    pub fn from_fit(
        id: impl Into<String>,
        text: impl Into<String>,
        angle: impl Into<String>,
        report: &FitReport,
    ) -> Option<Self> {
        if !report.fits {
            return None;
        }
        Some(FieldCandidate {
            id: id.into(),
            text: text.into(),
            angle: angle.into(),
            font_px: report.font_px?,
            lines: report.lines?,
            hyphenated: report.used_hyphenation.unwrap_or(false),
            penalties: report.reasons.len() as f32,
        })
    }
}

/// Per-angle share limits, as fractions of `k`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AngleQuotas {
    #[serde(default)]
    pub min_pct: BTreeMap<String, f32>,
    #[serde(default)]
    pub max_pct: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    pub k: usize,
    #[serde(default)]
    pub novelty_key: Option<NoveltyKey>,
    #[serde(default)]
    pub quotas: Option<AngleQuotas>,
    pub lambda: f32,
}

impl Default for SelectOptions {
    fn default() -> Self {
        SelectOptions {
            k: 3,
            novelty_key: None,
            quotas: None,
            lambda: DEFAULT_MMR_LAMBDA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: FieldCandidate,
    pub score: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

pub fn base_score(c: &FieldCandidate) -> f32 {
    let mut score = (1.0 + c.font_px as f32).ln() - PENALTY_WEIGHT * c.penalties;
    if c.lines > MANY_LINES_THRESHOLD {
        score -= MANY_LINES_PENALTY;
    }
    if c.hyphenated {
        score -= HYPHENATED_PENALTY;
    }
    score - text_quality_penalty(&c.text)
}

fn novelty_overlap(grams: &BTreeSet<String>, seen: &BTreeSet<String>) -> f32 {
    if grams.is_empty() {
        return 0.0;
    }
    grams.intersection(seen).count() as f32 / grams.len() as f32
}

struct Scored<'a> {
    candidate: &'a FieldCandidate,
    grams: BTreeSet<String>,
    score: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Selects at most `opts.k` candidates. Novelty-store failures never fail selection.
pub fn select_top(
    candidates: &[FieldCandidate],
    opts: &SelectOptions,
    store: Option<&dyn NoveltyStore>,
) -> Vec<ScoredCandidate> {
    if opts.k == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let novelty = match (&opts.novelty_key, store) {
        (Some(key), Some(store)) => store.load(key).unwrap_or_else(|e| {
            warn!(brand = %key.brand_id, template = %key.template_id, error = %e, "Novelty store unreadable; ignoring novelty");
            BTreeSet::new()
        }),
        _ => BTreeSet::new(),
    };

    let scored: Vec<Scored<'_>> = candidates
        .iter()
        .map(|c| {
            let grams = trigrams(&c.text);
            let score = base_score(c) - NOVELTY_WEIGHT * novelty_overlap(&grams, &novelty);
            Scored {
                candidate: c,
                grams,
                score,
            }
        })
        .collect();

    let pool = mmr_pool(&scored, (2 * opts.k).min(scored.len()), opts.lambda);
    let chosen = apply_quotas(&scored, &pool, opts);

    if let (Some(key), Some(store)) = (&opts.novelty_key, store) {
        let mut union = BTreeSet::new();
        for &i in &chosen {
            union.extend(scored[i].grams.iter().cloned());
        }
        if let Err(e) = store.merge(key, &union) {
            warn!(brand = %key.brand_id, template = %key.template_id, error = %e, "Novelty store unwritable; selection kept");
        }
    }

    let mut out: Vec<ScoredCandidate> = chosen
        .into_iter()
        .map(|i| ScoredCandidate {
            candidate: scored[i].candidate.clone(),
            score: scored[i].score,
        })
        .collect();
    out.sort_by(|a, b| b.score.total_cmp(&a.score));
    debug!(candidates = candidates.len(), selected = out.len(), "Selected top candidates");
    out
}

/// Indices into `scored`, in MMR order.
fn mmr_pool(scored: &[Scored<'_>], size: usize, lambda: f32) -> Vec<usize> {
    let mut pool: Vec<usize> = Vec::with_capacity(size);
    let mut remaining: Vec<usize> = (0..scored.len()).collect();

    while pool.len() < size && !remaining.is_empty() {
        let mut best: Option<(usize, f32)> = None;
        for (pos, &i) in remaining.iter().enumerate() {
            let value = if pool.is_empty() {
                scored[i].score
            } else {
                let redundancy = pool
                    .iter()
                    .map(|&j| jaccard(&scored[i].grams, &scored[j].grams))
                    .fold(0.0_f32, f32::max);
                lambda * scored[i].score - (1.0 - lambda) * redundancy
            };
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((pos, value));
            }
        }
        match best {
            Some((pos, _)) => pool.push(remaining.remove(pos)),
            None => break,
        }
    }
    pool
}

/// Picks up to `k` pool entries honoring per-angle minimums and maximums.
fn apply_quotas(scored: &[Scored<'_>], pool: &[usize], opts: &SelectOptions) -> Vec<usize> {
    let k = opts.k;
    let Some(quotas) = &opts.quotas else {
        return pool.iter().copied().take(k).collect();
    };

    let cap = |angle: &str| {
        quotas
            .max_pct
            .get(angle)
            .map(|pct| (pct * k as f32).ceil() as usize)
    };
    let mut chosen: Vec<usize> = Vec::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    let take = |i: usize, chosen: &mut Vec<usize>, counts: &mut BTreeMap<String, usize>| {
        let angle = scored[i].candidate.angle.as_str();
        let count = counts.get(angle).copied().unwrap_or(0);
        if chosen.len() >= k || chosen.contains(&i) || cap(angle).is_some_and(|c| count >= c) {
            return;
        }
        chosen.push(i);
        counts.insert(angle.to_string(), count + 1);
    };

    for (angle, pct) in &quotas.min_pct {
        let need = (pct * k as f32).ceil() as usize;
        for &i in pool {
            if counts.get(angle).copied().unwrap_or(0) >= need {
                break;
            }
            if scored[i].candidate.angle == *angle {
                take(i, &mut chosen, &mut counts);
            }
        }
    }
    for &i in pool {
        take(i, &mut chosen, &mut counts);
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CopyfitError, Result};
    use crate::ranking::novelty::MemoryNoveltyStore;

    fn cand(id: &str, text: &str, angle: &str, font_px: u32) -> FieldCandidate {
        FieldCandidate {
            id: id.to_string(),
            text: text.to_string(),
            angle: angle.to_string(),
            font_px,
            lines: 2,
            hyphenated: false,
            penalties: 0.0,
        }
    }

    fn ids(out: &[ScoredCandidate]) -> Vec<&str> {
        out.iter().map(|s| s.candidate.id.as_str()).collect()
    }

    #[test]
    fn test_base_score_components() {
        let plain = cand("a", "Fresh bread delivered daily", "x", 100);
        let mut worse = plain.clone();
        worse.lines = 4;
        worse.hyphenated = true;
        worse.penalties = 1.0;
        let diff = base_score(&plain) - base_score(&worse);
        assert!((diff - (0.5 + 0.2 + 0.05)).abs() < 1e-5, "diff was {diff}");
    }

    #[test]
    fn test_never_more_than_k() {
        let cs: Vec<_> = (0..10)
            .map(|i| cand(&format!("c{i}"), &format!("Distinct line number {}", "x".repeat(i + 1)), "a", 50 + i as u32))
            .collect();
        for k in [0, 1, 3, 10, 20] {
            let out = select_top(&cs, &SelectOptions { k, ..SelectOptions::default() }, None);
            assert!(out.len() <= k, "k={k} returned {}", out.len());
        }
    }

    #[test]
    fn test_mmr_prefers_diverse_runner_up() {
        let cs = vec![
            cand("a", "Fresh bread delivered daily", "x", 100),
            cand("a2", "Fresh bread delivered daily!", "x", 100),
            cand("b", "Coffee roasted every morning", "x", 90),
        ];
        let out = select_top(&cs, &SelectOptions { k: 2, ..SelectOptions::default() }, None);
        assert_eq!(ids(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_novelty_penalizes_repeated_phrasing() {
        let store = MemoryNoveltyStore::new();
        let key = NoveltyKey::new("acme", "square");
        store.merge(&key, &trigrams("Fresh bread delivered daily")).unwrap();

        let cs = vec![
            cand("old", "Fresh bread delivered daily", "x", 80),
            cand("new", "Coffee roasted every morning", "x", 80),
        ];
        let opts = SelectOptions {
            k: 1,
            novelty_key: Some(key.clone()),
            ..SelectOptions::default()
        };
        let out = select_top(&cs, &opts, Some(&store));
        assert_eq!(ids(&out), vec!["new"]);
        let stored = store.load(&key).unwrap();
        assert!(stored.is_superset(&trigrams("Coffee roasted every morning")));
    }

    #[test]
    fn test_quotas_respect_min_and_max() {
        let cs = vec![
            cand("p1", "Tired of stale loaves", "pain", 120),
            cand("p2", "Sick of soggy crusts", "pain", 118),
            cand("p3", "Done with dry sandwiches", "pain", 116),
            cand("p4", "Bored by bland toast", "pain", 114),
            cand("b1", "Warm bread at sunrise", "benefit", 60),
            cand("b2", "Golden crust every time", "benefit", 58),
        ];
        let quotas = AngleQuotas {
            min_pct: BTreeMap::from([("benefit".to_string(), 0.3)]),
            max_pct: BTreeMap::from([("pain".to_string(), 0.5)]),
        };
        let opts = SelectOptions {
            k: 3,
            quotas: Some(quotas),
            ..SelectOptions::default()
        };
        let out = select_top(&cs, &opts, None);
        let count = |a: &str| out.iter().filter(|s| s.candidate.angle == a).count();
        assert_eq!(out.len(), 3);
        assert!(count("pain") <= 2, "pain capped at ceil(0.5*3)=2");
        assert!(count("benefit") >= 1, "benefit needs ceil(0.3*3)=1");
    }

    struct BrokenStore;

    impl NoveltyStore for BrokenStore {
        fn load(&self, _key: &NoveltyKey) -> Result<BTreeSet<String>> {
            Err(CopyfitError::Novelty("offline".to_string()))
        }
        fn merge(&self, _key: &NoveltyKey, _trigrams: &BTreeSet<String>) -> Result<()> {
            Err(CopyfitError::Novelty("offline".to_string()))
        }
    }

    #[test]
    fn test_broken_store_degrades_to_no_novelty() {
        let cs = vec![cand("a", "Fresh bread delivered daily", "x", 80)];
        let opts = SelectOptions {
            k: 1,
            novelty_key: Some(NoveltyKey::new("b", "t")),
            ..SelectOptions::default()
        };
        let out = select_top(&cs, &opts, Some(&BrokenStore));
        assert_eq!(ids(&out), vec!["a"]);
    }
}
