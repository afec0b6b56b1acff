//! Error types for artifact generation.

/// Errors raised while rendering artifacts.
///
/// Rendering only reads a finished allocation, so these indicate a bug in a
/// generator rather than bad input.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The JSON manifest could not be serialized.
    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
}
