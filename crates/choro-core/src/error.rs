use thiserror::Error;

/// Failures at the crate's input boundaries.
///
/// The classification engine itself never fails: empty, degenerate and
/// numerically unstable inputs all have defined outputs. Only parameter
/// validation and JSON reading or writing can produce one of these.
#[derive(Debug, Error)]
pub enum ChoroError {
    #[error("class count must be in 1..={max}, got {got}")]
    InvalidClassCount { got: usize, max: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document is not a FeatureCollection (found type {found:?})")]
    NotACollection { found: Option<String> },
}

pub type Result<T> = std::result::Result<T, ChoroError>;
