//! # Remote Content Generator
//!
//! Boundary to the hosted generative model. Implementations only provide the
//! two raw calls (text completion and image generation); the flyer-level
//! operations are built on top of them here so every backend shares the same
//! prompts and response handling.
//!
//! ## Operations
//!
//! | Method | Result |
//! |--------|--------|
//! | [`ContentGenerator::generate_markup`] | flyer markup fragment |
//! | [`ContentGenerator::generate_copy_variants`] | `Title;Subtitle;...` options |
//! | [`ContentGenerator::generate_image`] | `data:` URL |
//! | [`ContentGenerator::suggest_image_prompt`] | prompt text |
//!
//! There is no retry policy; every failure is returned to the caller.

pub mod gemini;
pub mod prompt;

pub use gemini::{GeminiClient, GeneratorConfig};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::PlacardError;
use crate::flyer::{FlyerOptions, FlyerType};

/// Markup shown in place of a flyer when generation fails.
pub const ERROR_FRAGMENT: &str = r#"<div class="p-8 text-red-500 flex items-center justify-center h-full">Sorry, an error occurred while generating the flyer. Please try again.</div>"#;

/// Which images the user has attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssetFlags {
    pub logo: bool,
    pub speaker: bool,
    pub background: bool,
    pub qr: bool,
}

/// Purpose of a text completion; backends pick a model per task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTask {
    Markup,
    Copy,
    ImagePrompt,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Run one text completion and return the raw response text.
    async fn complete_text(&self, task: TextTask, prompt: &str) -> Result<String, PlacardError>;

    /// Generate one image and return it as a `data:` URL.
    async fn complete_image(&self, prompt: &str) -> Result<String, PlacardError>;

    async fn generate_markup(
        &self,
        options: &FlyerOptions,
        flags: AssetFlags,
        variation: Option<&str>,
    ) -> Result<String, PlacardError> {
        let prompt = prompt::flyer_prompt(options, flags, variation);
        let text = self.complete_text(TextTask::Markup, &prompt).await?;
        let markup = prompt::strip_fences(&text);
        if markup.is_empty() {
            return Err(PlacardError::RemoteParse("model returned no markup".to_string()));
        }
        Ok(markup)
    }

    async fn generate_copy_variants(
        &self,
        flyer_type: FlyerType,
        topic: &str,
    ) -> Result<Vec<String>, PlacardError> {
        if topic.trim().is_empty() {
            return Err(PlacardError::EmptyInput(
                "Please provide a topic for the flyer to generate suggestions.".to_string(),
            ));
        }
        let prompt = prompt::copy_prompt(flyer_type, topic);
        let text = self.complete_text(TextTask::Copy, &prompt).await?;
        Ok(prompt::split_copy_variants(&text))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, PlacardError> {
        if prompt.trim().is_empty() {
            return Err(PlacardError::EmptyInput("image prompt is empty".to_string()));
        }
        self.complete_image(prompt).await
    }

    async fn suggest_image_prompt(&self, topic: &str) -> Result<String, PlacardError> {
        let prompt = prompt::image_prompt_suggestion(topic);
        let text = self.complete_text(TextTask::ImagePrompt, &prompt).await?;
        Ok(text.trim().to_string())
    }
}

/// Generate markup, substituting [`ERROR_FRAGMENT`] for any failure.
pub async fn markup_or_fallback(
    generator: &dyn ContentGenerator,
    options: &FlyerOptions,
    flags: AssetFlags,
    variation: Option<&str>,
) -> String {
    match generator.generate_markup(options, flags, variation).await {
        Ok(markup) => markup,
        Err(e) => {
            tracing::warn!(error = %e, "flyer generation failed");
            ERROR_FRAGMENT.to_string()
        }
    }
}
