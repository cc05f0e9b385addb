//! QR code encoding for the flyer's optional link.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};

use crate::error::PlacardError;

/// Turns a URL into a displayable image source.
pub trait QrEncoder: Send + Sync {
    /// Encode `url` and return a `data:` URL for the rendered code.
    fn encode(&self, url: &str) -> Result<String, PlacardError>;
}

/// Renders QR codes as square PNGs.
#[derive(Debug, Clone, Copy)]
pub struct PngQrEncoder {
    /// Output edge length in pixels.
    pub size: u32,
    /// Quiet zone in modules on each side.
    pub margin: u32,
}

impl Default for PngQrEncoder {
    fn default() -> Self {
        Self { size: 256, margin: 1 }
    }
}

impl PngQrEncoder {
    /// Rasterize the code at exactly `size`×`size`, sampling modules by nearest neighbour.
    fn render(&self, code: &QrCode) -> GrayImage {
        let modules = code.width() as u32;
        let total = modules + self.margin * 2;
        let size = self.size.max(total);

        GrayImage::from_fn(size, size, |px, py| {
            let mx = (px * total / size) as i64 - self.margin as i64;
            let my = (py * total / size) as i64 - self.margin as i64;
            let inside = mx >= 0 && my >= 0 && mx < modules as i64 && my < modules as i64;
            if inside && code[(mx as usize, my as usize)] == qrcode::Color::Dark {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }
}

impl QrEncoder for PngQrEncoder {
    fn encode(&self, url: &str) -> Result<String, PlacardError> {
        let code = QrCode::with_error_correction_level(url, EcLevel::M)
            .map_err(|e| PlacardError::Image(format!("QR code generation failed: {}", e)))?;

        let img = self.render(&code);
        let mut png = Cursor::new(Vec::new());
        img.write_to(&mut png, ImageFormat::Png)
            .map_err(|e| PlacardError::Image(format!("Failed to encode QR PNG: {}", e)))?;

        Ok(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(png.into_inner())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produces_png_data_url() {
        let data_url = PngQrEncoder::default()
            .encode("https://example.com")
            .unwrap();
        let payload = data_url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), 256);
        assert_eq!(img.height(), 256);
    }

    #[test]
    fn test_quiet_zone_is_white() {
        let code = QrCode::new("https://example.com").unwrap();
        let img = PngQrEncoder::default().render(&code);
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        // first finder pattern module sits just inside the margin
        let cell = 256 / (code.width() as u32 + 2);
        assert_eq!(img.get_pixel(cell + 1, cell + 1).0[0], 0);
    }
}
