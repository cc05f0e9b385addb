//! # Option State
//!
//! One user's in-memory flyer session: the option fields, the three image
//! slots, the QR payload, the latest generated markup, and the preview and
//! export state derived from them.
//!
//! Every field is replaced as a whole value. Any change that alters the
//! composed document rebuilds the export copy, which resets its readiness
//! before anything else happens.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::error::PlacardError;
use crate::export::{ExportPipeline, ExportStatus};
use crate::flyer::{CanvasDimensions, FlyerOptions};
use crate::generator::AssetFlags;
use crate::intake::{ImageFile, ImageSlot};
use crate::placeholder::{self, Placeholder, PlaceholderAssets};
use crate::qr::QrEncoder;
use crate::render::{self, ComposedDocument, ViewState, Viewport};

/// Proof that a generation request was started; only the latest one may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket(u64);

/// Inputs captured when a generation request starts.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub ticket: GenerationTicket,
    pub options: FlyerOptions,
    pub flags: AssetFlags,
}

pub struct FlyerSession {
    options: FlyerOptions,
    logo: Option<ImageFile>,
    speaker: Option<ImageFile>,
    background: Option<ImageFile>,
    qr_url: String,
    qr_image: Option<String>,
    markup: String,
    copy_suggestions: Vec<String>,
    latest_ticket: u64,
    composed_html: Option<String>,
    viewport: Viewport,
    export: Arc<ExportPipeline>,
    qr_encoder: Arc<dyn QrEncoder>,
    pub last_accessed: Instant,
}

impl FlyerSession {
    /// Create a session showing the welcome fragment. Requires a Tokio runtime.
    pub fn new(export: ExportPipeline, qr_encoder: Arc<dyn QrEncoder>) -> Self {
        let mut session = Self {
            options: FlyerOptions::default(),
            logo: None,
            speaker: None,
            background: None,
            qr_url: String::new(),
            qr_image: None,
            markup: render::WELCOME_FRAGMENT.to_string(),
            copy_suggestions: Vec::new(),
            latest_ticket: 0,
            composed_html: None,
            viewport: Viewport::new(),
            export: Arc::new(export),
            qr_encoder,
            last_accessed: Instant::now(),
        };
        session.recompose();
        session
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    pub fn options(&self) -> &FlyerOptions {
        &self.options
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn dimensions(&self) -> CanvasDimensions {
        self.options.dimensions()
    }

    /// Shared handle so exports can run without holding the session.
    pub fn export(&self) -> &Arc<ExportPipeline> {
        &self.export
    }

    pub fn image(&self, slot: ImageSlot) -> Option<&ImageFile> {
        match slot {
            ImageSlot::Logo => self.logo.as_ref(),
            ImageSlot::Speaker => self.speaker.as_ref(),
            ImageSlot::Background => self.background.as_ref(),
        }
    }

    pub fn qr_image(&self) -> Option<&str> {
        self.qr_image.as_deref()
    }

    /// Replace all option fields at once.
    pub fn set_options(&mut self, options: FlyerOptions) -> Result<(), PlacardError> {
        options.validate().map_err(PlacardError::Parse)?;
        self.options = options;
        self.recompose();
        Ok(())
    }

    /// Put an image into a slot, or clear it with `None`.
    pub fn set_image(&mut self, slot: ImageSlot, image: Option<ImageFile>) {
        match slot {
            ImageSlot::Logo => self.logo = image,
            ImageSlot::Speaker => self.speaker = image,
            ImageSlot::Background => self.background = image,
        }
        self.recompose();
    }

    /// Set the QR link. Blank clears it; an unencodable link also leaves no QR image.
    pub fn set_qr_url(&mut self, url: &str) {
        self.qr_url = url.to_string();
        self.qr_image = if url.trim().is_empty() {
            None
        } else {
            match self.qr_encoder.encode(url.trim()) {
                Ok(image) => Some(image),
                Err(e) => {
                    tracing::warn!(error = %e, "QR code generation failed");
                    None
                }
            }
        };
        self.recompose();
    }

    pub fn set_copy_suggestions(&mut self, suggestions: Vec<String>) {
        self.copy_suggestions = suggestions;
    }

    /// Which images a generation request should ask the model to place.
    pub fn flags(&self) -> AssetFlags {
        AssetFlags {
            logo: self.logo.is_some(),
            speaker: self.speaker.is_some(),
            background: self.background.is_some(),
            qr: self.qr_image.is_some(),
        }
    }

    pub fn assets(&self) -> PlaceholderAssets {
        PlaceholderAssets {
            logo: self.logo.as_ref().map(ImageFile::src),
            speaker: self.speaker.as_ref().map(ImageFile::src),
            background: self.background.as_ref().map(ImageFile::src),
            qr: self.qr_image.clone(),
        }
    }

    /// Start a generation; any earlier in-flight request becomes stale.
    pub fn begin_generation(&mut self) -> GenerationRequest {
        self.latest_ticket += 1;
        GenerationRequest {
            ticket: GenerationTicket(self.latest_ticket),
            options: self.options.clone(),
            flags: self.flags(),
        }
    }

    /// Store generated markup if `ticket` is still the latest. Returns whether it was applied.
    pub fn finish_generation(&mut self, ticket: GenerationTicket, markup: String) -> bool {
        if ticket.0 != self.latest_ticket {
            tracing::debug!(ticket = ticket.0, latest = self.latest_ticket, "dropping stale generation");
            return false;
        }
        self.markup = markup;
        self.recompose();
        true
    }

    /// The full document for the current markup, images and canvas.
    pub fn composed(&self) -> ComposedDocument {
        let substituted = placeholder::substitute(&self.markup, &self.assets());
        render::compose(&substituted, self.dimensions())
    }

    /// Feed a preview container width and get the resulting view state.
    pub fn observe_viewport(&mut self, container_width: f64) -> ViewState {
        self.viewport.observe(container_width);
        self.viewport.state()
    }

    /// Feed a numbered container width; older numbers than the latest applied are ignored.
    pub fn observe_viewport_sequenced(&mut self, seq: u64, container_width: f64) -> ViewState {
        self.viewport.observe_sequenced(seq, container_width);
        self.viewport.state()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn recompose(&mut self) {
        let document = self.composed();
        if self.composed_html.as_deref() == Some(document.html.as_str()) {
            return;
        }
        self.composed_html = Some(document.html.clone());
        self.viewport.compose(document.dimensions);
        self.export.rebuild(document);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let markup = placeholder::substitute(&self.markup, &self.assets());
        SessionSnapshot {
            options: self.options.clone(),
            dimensions: self.dimensions(),
            images: SlotSnapshot {
                logo: self.logo.clone(),
                speaker: self.speaker.clone(),
                background: self.background.clone(),
            },
            qr_url: self.qr_url.clone(),
            has_qr: self.qr_image.is_some(),
            unresolved: placeholder::unresolved(&markup),
            copy_suggestions: self.copy_suggestions.clone(),
            view: self.viewport.state(),
            export: self.export.status(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SlotSnapshot {
    pub logo: Option<ImageFile>,
    pub speaker: Option<ImageFile>,
    pub background: Option<ImageFile>,
}

/// JSON view of a session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub options: FlyerOptions,
    pub dimensions: CanvasDimensions,
    pub images: SlotSnapshot,
    pub qr_url: String,
    pub has_qr: bool,
    pub unresolved: Vec<Placeholder>,
    pub copy_suggestions: Vec<String>,
    pub view: ViewState,
    pub export: ExportStatus,
}
