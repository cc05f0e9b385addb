//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Mutex;

use async_trait::async_trait;
use placard::PlacardError;
use placard::export::{AssetLoader, Rasterizer};
use placard::generator::{ContentGenerator, TextTask};
use placard::render::ComposedDocument;

/// Markup referencing every image token, as a well-behaved model would emit.
pub const FULL_MARKUP: &str = r#"<div class="relative w-[1080px] h-[1920px] overflow-hidden" style="background-image: url('[BACKGROUND_IMAGE_URL]')">
  <img src="[LOGO_IMAGE_URL]" class="w-24">
  <h1 class="text-6xl">Innovate &amp; Create</h1>
  <img src="[SPEAKER_IMAGE_URL]" class="rounded-full">
  <img src="[QR_CODE_IMAGE_URL]" class="w-32">
</div>"#;

/// Generator answering from fixed strings and recording every prompt.
pub struct ScriptedGenerator {
    pub markup: String,
    pub copy: String,
    pub image: Result<String, String>,
    pub prompts: Mutex<Vec<(TextTask, String)>>,
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self {
            markup: format!("```html\n{}\n```", FULL_MARKUP),
            copy: "Design Forward;AI Meets Craft;Live demos;July 20\n---\nCreate Boldly;The AI Design Summit;Hands-on labs;Free entry".to_string(),
            image: Ok("data:image/png;base64,iVBORw0KGgo=".to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedGenerator {
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .map(|(_, p)| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn complete_text(&self, task: TextTask, prompt: &str) -> Result<String, PlacardError> {
        self.prompts.lock().unwrap().push((task, prompt.to_string()));
        Ok(match task {
            TextTask::Markup => self.markup.clone(),
            TextTask::Copy => self.copy.clone(),
            TextTask::ImagePrompt => "  A neon-lit city skyline at dusk  ".to_string(),
        })
    }

    async fn complete_image(&self, _prompt: &str) -> Result<String, PlacardError> {
        self.image.clone().map_err(PlacardError::Remote)
    }
}

/// Every asset loads instantly.
pub struct InstantLoader;

#[async_trait]
impl AssetLoader for InstantLoader {
    async fn load(&self, _url: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Assets whose URL contains "blocked" fail to load.
pub struct SelectiveLoader;

#[async_trait]
impl AssetLoader for SelectiveLoader {
    async fn load(&self, url: &str) -> Result<(), String> {
        if url.contains("blocked") {
            Err("cross-origin image refused".to_string())
        } else {
            Ok(())
        }
    }
}

/// Paints a flat canvas-sized PNG in the flyer's primary color.
pub struct SolidRasterizer;

#[async_trait]
impl Rasterizer for SolidRasterizer {
    async fn to_png(&self, document: &ComposedDocument) -> Result<Vec<u8>, String> {
        let dims = document.dimensions;
        let img = image::RgbaImage::from_pixel(dims.width, dims.height, image::Rgba([99, 102, 241, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| e.to_string())?;
        Ok(out.into_inner())
    }
}

/// A tiny valid PNG file.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}
