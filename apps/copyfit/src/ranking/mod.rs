// Ranking: single-field top-k selection with novelty and diversity, and whole-bundle
// fitting with aggregate scoring.

pub mod bundle;
pub mod novelty;
pub mod select;

pub use bundle::{
    fit_bundle_all_roles, final_score, per_area_score, pick_top_bundle_by_aggregate, AreaFit,
    BundleFit, ScoreBreakdown,
};
pub use novelty::{FileNoveltyStore, MemoryNoveltyStore, NoveltyKey, NoveltyStore};
pub use select::{select_top, AngleQuotas, FieldCandidate, ScoredCandidate, SelectOptions};
