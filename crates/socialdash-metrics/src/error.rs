use thiserror::Error;

/// Structural problems in raw input.
///
/// Field-level gaps (missing numbers, unknown enum values) never produce an
/// error; they normalize to defaults. These variants mean the caller handed
/// over data of the wrong shape, and `path` names where.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("malformed input at {path}: expected an object, found {found}")]
    ExpectedObject { path: String, found: &'static str },

    #[error("malformed input at {path}: expected an array, found {found}")]
    ExpectedArray { path: String, found: &'static str },
}

impl MetricsError {
    /// Field path of the offending value, e.g. `ads[3]`.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            MetricsError::ExpectedObject { path, .. } | MetricsError::ExpectedArray { path, .. } => {
                path
            }
        }
    }
}
