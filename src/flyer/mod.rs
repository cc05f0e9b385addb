//! # Flyer Data Model
//!
//! The configuration a user edits: content fields, branding colors, the
//! canvas preset and the style theme. These values feed both the prompt sent
//! to the generator and the size of every rendered document.

pub mod catalog;
mod options;
mod text;

pub use options::{CanvasDimensions, CanvasFormat, FlyerOptions, FlyerType, StyleTheme};
pub use text::{PrimaryText, parse_details};
