use thiserror::Error;

/// Failure reported by an external renderer (diagram, math, image).
///
/// The engine never surfaces these to its caller; they decide which fallback
/// is shown in place of the rendered content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("renderer timed out after {0} ms")]
    Timeout(u64),
    #[error("invalid source: {0}")]
    InvalidSource(String),
    #[error("renderer backend failed: {0}")]
    Backend(String),
    #[error("render was cancelled")]
    Cancelled,
}
