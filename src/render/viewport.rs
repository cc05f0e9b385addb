//! Scaled-preview state machine.

use serde::Serialize;

use crate::flyer::CanvasDimensions;

/// Where the preview is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing composed yet.
    Idle,
    /// A document is composed but no container width has been observed for it.
    Composing,
    /// Displayed at `scale` = container width / canvas width.
    ScaledDisplay { scale: f64 },
}

/// Tracks the scale applied to the preview of one composed document.
///
/// Every container resize must be fed to [`Viewport::observe`]; the scale is
/// always derived from the most recent observation. Observations that can
/// arrive out of order carry a sequence number through
/// [`Viewport::observe_sequenced`].
#[derive(Debug, Clone)]
pub struct Viewport {
    dimensions: Option<CanvasDimensions>,
    last_width: Option<f64>,
    last_seq: Option<u64>,
    state: ViewState,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            dimensions: None,
            last_width: None,
            last_seq: None,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// A new document was composed.
    ///
    /// Same-size recompositions keep the current scale; a new canvas size
    /// waits for the next observation, or rescales immediately from the last
    /// known container width.
    pub fn compose(&mut self, dimensions: CanvasDimensions) {
        let size_changed = self.dimensions != Some(dimensions);
        self.dimensions = Some(dimensions);
        if size_changed || self.state == ViewState::Idle {
            self.state = ViewState::Composing;
            if let Some(width) = self.last_width {
                self.observe(width);
            }
        }
    }

    /// Record the container's current width and recompute the scale.
    ///
    /// Returns the new scale, or `None` if nothing is composed or the width is
    /// not a finite non-negative number.
    pub fn observe(&mut self, container_width: f64) -> Option<f64> {
        if !container_width.is_finite() || container_width < 0.0 {
            return None;
        }
        self.last_width = Some(container_width);
        let dims = self.dimensions?;
        let scale = container_width / dims.width as f64;
        self.state = ViewState::ScaledDisplay { scale };
        Some(scale)
    }

    /// Like [`Viewport::observe`], but drops any observation older than one
    /// already applied. Returns whether `seq` was accepted.
    pub fn observe_sequenced(&mut self, seq: u64, container_width: f64) -> bool {
        if self.last_seq.is_some_and(|last| seq < last) {
            tracing::debug!(seq, latest = ?self.last_seq, "dropping stale viewport observation");
            return false;
        }
        if !container_width.is_finite() || container_width < 0.0 {
            return false;
        }
        self.last_seq = Some(seq);
        self.observe(container_width);
        true
    }

    /// Highest sequence number applied so far.
    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    pub fn scale(&self) -> Option<f64> {
        match self.state {
            ViewState::ScaledDisplay { scale } => Some(scale),
            _ => None,
        }
    }

    /// The preview stays hidden until it has a positive scale.
    pub fn is_visible(&self) -> bool {
        self.scale().is_some_and(|s| s > 0.0)
    }

    /// CSS `transform` for the preview frame.
    pub fn transform_css(&self) -> String {
        format!("scale({})", self.scale().unwrap_or(0.0))
    }

    /// Container bottom padding that keeps the canvas aspect ratio.
    pub fn padding_bottom_css(&self) -> Option<String> {
        self.dimensions
            .map(|d| format!("{}%", d.aspect_padding_percent()))
    }
}
