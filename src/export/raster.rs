//! Rasterizers: turn a composed document into encoded image bytes.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;
use tokio::process::Command;
use uuid::Uuid;

use crate::flyer::CanvasDimensions;
use crate::render::ComposedDocument;

/// Captures the flyer root of a composed document at full canvas size.
///
/// Errors are plain messages; the export pipeline wraps them in the
/// user-facing notice.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Lossless capture of exactly `width × height` pixels.
    async fn to_png(&self, document: &ComposedDocument) -> Result<Vec<u8>, String>;

    /// Lossy capture; `quality` is 1-100.
    async fn to_jpeg(&self, document: &ComposedDocument, quality: u8) -> Result<Vec<u8>, String> {
        let png = self.to_png(document).await?;
        tokio::task::spawn_blocking(move || png_to_jpeg(&png, quality))
            .await
            .map_err(|e| format!("Task error: {}", e))?
    }
}

/// Re-encode PNG bytes as JPEG, flattening any alpha onto white.
pub fn png_to_jpeg(png: &[u8], quality: u8) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| format!("Failed to decode capture: {}", e))?;

    let rgba = img.to_rgba8();
    let rgb = image::RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        image::Rgb([blend(r), blend(g), blend(b)])
    });

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| format!("Failed to encode JPEG: {}", e))?;
    Ok(out)
}

/// Crop a capture to the canvas region. A capture smaller than the canvas is an error.
pub fn crop_to_canvas(png: &[u8], dims: CanvasDimensions) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory_with_format(png, ImageFormat::Png)
        .map_err(|e| format!("Failed to decode capture: {}", e))?;

    if img.width() < dims.width || img.height() < dims.height {
        return Err(format!(
            "capture is {}x{}, expected at least {}x{}",
            img.width(),
            img.height(),
            dims.width,
            dims.height
        ));
    }
    if img.width() == dims.width && img.height() == dims.height {
        return Ok(png.to_vec());
    }

    let cropped = img.crop_imm(0, 0, dims.width, dims.height);
    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| format!("Failed to encode PNG: {}", e))?;
    Ok(out.into_inner())
}

/// Rasterizes with a headless Chromium binary (`--screenshot`).
#[derive(Debug, Clone)]
pub struct ChromeRasterizer {
    /// Browser executable (e.g. `chromium`, `google-chrome`).
    pub binary: PathBuf,
    /// Virtual time granted to the page to finish loading before capture.
    pub virtual_time_budget: Duration,
    /// Hard limit on the browser process.
    pub timeout: Duration,
    /// Extra command-line flags (e.g. `--no-sandbox` inside containers).
    pub extra_args: Vec<String>,
}

impl ChromeRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            virtual_time_budget: Duration::from_secs(5),
            timeout: Duration::from_secs(60),
            extra_args: Vec::new(),
        }
    }

    async fn capture(&self, document: &ComposedDocument, dir: &std::path::Path) -> Result<Vec<u8>, String> {
        let html_path = dir.join("flyer.html");
        let png_path = dir.join("flyer.png");
        tokio::fs::write(&html_path, &document.html)
            .await
            .map_err(|e| format!("Failed to write document: {}", e))?;

        let dims = document.dimensions;
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--hide-scrollbars")
            .arg(format!("--window-size={},{}", dims.width, dims.height))
            .arg(format!(
                "--virtual-time-budget={}",
                self.virtual_time_budget.as_millis()
            ))
            .arg(format!("--screenshot={}", png_path.display()))
            .args(&self.extra_args)
            .arg(format!("file://{}", html_path.display()))
            .kill_on_drop(true);

        tracing::debug!(binary = %self.binary.display(), width = dims.width, height = dims.height, "capturing flyer");

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| format!("browser timed out after {:?}", self.timeout))?
            .map_err(|e| format!("Failed to run {}: {}", self.binary.display(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "browser exited with {}: {}",
                output.status,
                stderr.lines().last().unwrap_or_default()
            ));
        }

        let png = tokio::fs::read(&png_path)
            .await
            .map_err(|e| format!("browser produced no screenshot: {}", e))?;
        tokio::task::spawn_blocking(move || crop_to_canvas(&png, dims))
            .await
            .map_err(|e| format!("Task error: {}", e))?
    }
}

#[async_trait]
impl Rasterizer for ChromeRasterizer {
    async fn to_png(&self, document: &ComposedDocument) -> Result<Vec<u8>, String> {
        let dir = std::env::temp_dir().join(format!("placard-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| format!("Failed to create work dir: {}", e))?;

        let result = self.capture(document, &dir).await;

        if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to clean up capture dir");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32, alpha: u8) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 0, 0, alpha]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_crop_to_canvas() {
        let dims = CanvasDimensions { width: 10, height: 20 };
        let cropped = crop_to_canvas(&png(12, 25, 255), dims).unwrap();
        let img = image::load_from_memory(&cropped).unwrap();
        assert_eq!((img.width(), img.height()), (10, 20));

        let exact = png(10, 20, 255);
        assert_eq!(crop_to_canvas(&exact, dims).unwrap(), exact);

        assert!(crop_to_canvas(&png(9, 20, 255), dims).is_err());
    }

    #[test]
    fn test_png_to_jpeg_flattens_alpha() {
        let jpeg = png_to_jpeg(&png(8, 8, 0), 98).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        // fully transparent black flattens to white
        assert!(img.get_pixel(4, 4).0[0] > 245);
    }

    #[tokio::test]
    async fn test_missing_browser_is_error() {
        let raster = ChromeRasterizer::new("/nonexistent/placard-browser");
        let doc = crate::render::compose("", CanvasDimensions { width: 4, height: 4 });
        let err = raster.to_png(&doc).await.unwrap_err();
        assert!(err.contains("Failed to run"));
    }
}
