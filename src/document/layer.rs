use std::sync::Arc;

use crate::document::blend::BlendMode;
use crate::foundation::core::Canvas;
use crate::foundation::math::{u8_to_unit, unit_to_u8};
use crate::pixel::buffer::PixelBuffer;

/// Layer opacity in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Opacity(f32);

impl Opacity {
    /// Fully opaque.
    pub const OPAQUE: Self = Self(1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self(0.0);

    /// Clamp into `[0, 1]`. Non-finite values fall back to fully opaque.
    pub fn new(v: f32) -> Self {
        if !v.is_finite() {
            tracing::warn!(opacity = v, "non-finite opacity replaced with 1.0");
            return Self::OPAQUE;
        }
        Self(v.clamp(0.0, 1.0))
    }

    /// Opacity from an 8-bit value as stored in layered documents.
    pub fn from_u8(v: u8) -> Self {
        Self(u8_to_unit(v))
    }

    /// Stored float value.
    pub fn get(self) -> f32 {
        self.0
    }

    /// 8-bit value, rounded to nearest (`0.5 -> 128`).
    pub fn to_u8(self) -> u8 {
        unit_to_u8(self.0)
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

impl From<f32> for Opacity {
    fn from(v: f32) -> Self {
        Self::new(v)
    }
}

impl From<f64> for Opacity {
    fn from(v: f64) -> Self {
        Self::new(v as f32)
    }
}

/// One named, blend-mode-tagged raster in a [`Document`](crate::Document).
///
/// Immutable once constructed. Pixel data is reference-counted so cloning a document snapshots
/// its layer list without copying pixels.
#[derive(Clone, Debug)]
pub struct Layer {
    pixels: Arc<PixelBuffer>,
    name: String,
    blend_mode: BlendMode,
    opacity: Opacity,
}

impl Layer {
    pub(crate) fn new(
        pixels: PixelBuffer,
        name: String,
        blend_mode: BlendMode,
        opacity: Opacity,
    ) -> Self {
        Self {
            pixels: Arc::new(pixels),
            name,
            blend_mode,
            opacity,
        }
    }

    /// Canonical pixel data.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    /// Display name (non-empty, not necessarily unique).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blend mode used when compositing and stored in the document.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Layer opacity.
    pub fn opacity(&self) -> Opacity {
        self.opacity
    }

    /// Layer extents.
    pub fn size(&self) -> Canvas {
        self.pixels.size()
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.blend_mode == other.blend_mode
            && self.opacity.to_u8() == other.opacity.to_u8()
            && (Arc::ptr_eq(&self.pixels, &other.pixels) || self.pixels == other.pixels)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/layer.rs"]
mod tests;
