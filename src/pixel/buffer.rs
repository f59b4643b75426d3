use crate::foundation::core::Canvas;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::pixel::adapter::{ChannelLayout, SampleArray, Samples};

/// Number of interleaved channels in a canonical buffer.
pub const CHANNELS: usize = 4;

/// Canonical raster: straight-alpha RGBA8, row-major, tightly packed.
///
/// Every input accepted by the engine is converted into this one representation before any
/// layer or compositing logic runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap already-canonical RGBA8 bytes.
    ///
    /// Fails when `data.len() != width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> LayerstackResult<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(LayerstackError::unsupported_shape(format!(
                "rgba8 buffer for {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A fully transparent buffer (alpha 0) of the given size.
    pub fn transparent(width: u32, height: u32) -> LayerstackResult<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// A buffer filled with one straight-alpha RGBA8 colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> LayerstackResult<Self> {
        let px = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| LayerstackError::unsupported_shape("pixel count overflow"))?;
        Ok(Self {
            width,
            height,
            data: rgba.repeat(px),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size as a [`Canvas`].
    pub fn size(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Raw RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer and return its RGBA8 bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * CHANNELS;
        let px = &self.data[idx..idx + CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// One row of RGBA8 bytes, or `None` when `y` is out of range.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = (self.width as usize) * CHANNELS;
        let start = (y as usize) * stride;
        Some(&self.data[start..start + stride])
    }

    /// xxh3-64 digest of the dimensions and pixel bytes.
    ///
    /// Two buffers with the same digest are, for practical purposes, byte-identical.
    pub fn digest(&self) -> u64 {
        let mut hasher = xxhash_rust::xxh3::Xxh3::new();
        hasher.update(&self.width.to_le_bytes());
        hasher.update(&self.height.to_le_bytes());
        hasher.update(&self.data);
        hasher.digest()
    }

    /// Convert into an [`image::RgbaImage`].
    pub fn to_rgba_image(&self) -> LayerstackResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(|| {
            LayerstackError::unsupported_shape("pixel buffer does not match its dimensions")
        })
    }

    /// Build a buffer from an [`image::RgbaImage`].
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    /// Channels-last `(H, W, 4)` float view with samples in `[0, 1]`.
    pub fn to_samples_f32(&self) -> SampleArray {
        let samples = self.data.iter().map(|&v| f32::from(v) / 255.0).collect();
        SampleArray {
            shape: vec![self.height as usize, self.width as usize, CHANNELS],
            samples: Samples::F32(samples),
            layout: Some(ChannelLayout::Last),
        }
    }
}

fn byte_len(width: u32, height: u32) -> LayerstackResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| LayerstackError::unsupported_shape("pixel buffer size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/buffer.rs"]
mod tests;
