//! # Error Types
//!
//! This module defines error types used throughout the placard library.

use thiserror::Error;

/// Notice shown when a flyer cannot be rasterized.
pub const RASTERIZE_NOTICE: &str = "Could not export the flyer. This may be due to security \
restrictions on external images. Try using a custom uploaded background instead of a stock photo.";

/// Main error type for placard operations
#[derive(Debug, Error)]
pub enum PlacardError {
    /// Missing or invalid configuration (e.g. no API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required user input was empty
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Remote generator call failed
    #[error("Remote error: {0}")]
    Remote(String),

    /// User-supplied input could not be interpreted
    #[error("Parse error: {0}")]
    Parse(String),

    /// The remote generator answered with something unusable
    #[error("Unexpected response: {0}")]
    RemoteParse(String),

    /// Image intake or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Export pipeline error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Unknown or expired session
    #[error("Session error: {0}")]
    Session(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures at the export boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    /// The off-screen document has not settled yet
    #[error("Export source is not ready")]
    NotReady,

    /// The composed document has no flyer root node
    #[error("Could not find flyer content to export")]
    NodeMissing,

    /// The rasterizer failed; carries the underlying cause
    #[error("{notice} ({0})", notice = RASTERIZE_NOTICE)]
    Rasterize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rasterize_message_carries_notice() {
        let err = PlacardError::from(ExportError::Rasterize("tainted canvas".into()));
        let msg = err.to_string();
        assert!(msg.contains("uploaded background"));
        assert!(msg.ends_with("(tainted canvas)"));
    }
}
