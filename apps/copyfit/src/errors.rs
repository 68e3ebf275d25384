use thiserror::Error;

/// Crate-level error type.
///
/// Layout infeasibility, hygiene findings and rejected bundles are reported as values
/// (`FitReport`, `ValidationIssue`, `BundleFit`), not errors. This type covers bad
/// template input, novelty store I/O and malformed colors.
#[derive(Debug, Error)]
pub enum CopyfitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("Novelty store error: {0}")]
    Novelty(String),
}

pub type Result<T> = std::result::Result<T, CopyfitError>;
