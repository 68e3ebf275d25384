// Hygiene: text cleanup, headline rules, coherence and bundle validation.
// Pure functions over strings; no measurement happens here.

pub mod coherence;
pub mod headline;
pub mod kinds;
pub mod text;
pub mod validation;

pub use coherence::{answer_shape, coherence_score, AnswerShape};
pub use headline::{clean_headline, is_interrogative, text_quality_penalty};
pub use text::{canonical_tokens, dedupe_keep_order, jaccard, strip_numerals, trigrams};
pub use validation::{
    validate_and_clean, BundleSignals, CleanPolicy, IssueKind, Severity, ValidationIssue,
    ValidationResult,
};
