//! Error types for each layer of the engine.

use crate::export::ExportState;
use mapposter_canvas2d::Canvas2dError;
use thiserror::Error;

/// A design document that cannot be accepted.
#[derive(Debug, Error)]
pub enum DesignError {
    /// Malformed JSON, unknown enum values, or unparseable colors.
    #[error("Invalid design JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported design version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Failure to obtain a basemap bitmap. Always recoverable by the exporter.
#[derive(Debug, Error)]
pub enum BasemapError {
    #[error("Basemap request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Basemap server returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode basemap image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to read basemap file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid basemap request: {0}")]
    InvalidRequest(String),
}

/// What went wrong during an export pass.
#[derive(Debug, Error)]
pub enum ExportErrorKind {
    #[error("invalid export request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Canvas(#[from] Canvas2dError),

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("PDF packaging failed: {0}")]
    Pdf(String),

    #[error("render task failed: {0}")]
    Task(String),
}

/// A failed export pass, tagged with the lifecycle state it failed in.
#[derive(Debug, Error)]
#[error("Export failed while {state}: {kind}")]
pub struct ExportError {
    pub state: ExportState,
    #[source]
    pub kind: ExportErrorKind,
}

impl ExportError {
    pub fn new(state: ExportState, kind: impl Into<ExportErrorKind>) -> Self {
        Self {
            state,
            kind: kind.into(),
        }
    }
}
