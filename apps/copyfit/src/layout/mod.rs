// Layout: measurement, wrapping, font-size search and role schema derivation.
// Everything here is synchronous and CPU-bound; measurement goes through `TextMeasurer`.

pub mod font_metrics;
pub mod hyphenate;
pub mod oracle;
pub mod schema;
pub mod wrap;

// Re-export the public API consumed by hygiene, ranking and the batch driver.
pub use font_metrics::{FontFamily, FontSpec, MemoMeasurer, StaticMetrics, TextMeasurer};
pub use oracle::{
    fit_group_uniform_font, fit_text, upper_bound_font_px, FitOptions, FitReason, FitReport,
    GroupFitResult,
};
pub use schema::{derive_role_schema, RoleSpec};
pub use wrap::{balanced_wrap, detect_script, Script, WrapOptions, WrapResult};
