//! Conversion error kinds.

use thiserror::Error;

/// Failures scoped to a single element. Each aborts only the element it
/// names and leaves the document untouched for it; the run continues with
/// the next candidate.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{element}: clip reference `{clip}` does not resolve to a node")]
    MissingClip { element: String, clip: String },

    #[error("{element}: {reason}")]
    DegenerateGeometry { element: String, reason: String },

    #[error("{element}: rasterizer export failed: {cause:#}")]
    Export { element: String, cause: anyhow::Error },

    #[error("{element}: document update failed: {cause:#}")]
    Document { element: String, cause: anyhow::Error },
}
