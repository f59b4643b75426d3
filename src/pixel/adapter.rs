use std::ops::Range;

use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::foundation::math::{u16_to_u8, unit_to_u8};
use crate::pixel::buffer::{CHANNELS, PixelBuffer};

/// Where the channel axis sits in a rank-3 (or batched rank-4) sample array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelLayout {
    /// `(H, W, C)`, interleaved samples.
    Last,
    /// `(C, H, W)`, planar samples.
    First,
}

/// Typed sample storage of a raw image array.
#[derive(Clone, Debug, PartialEq)]
pub enum Samples {
    /// 8-bit integer samples, used as is.
    U8(Vec<u8>),
    /// 16-bit integer samples, scaled to 8 bits.
    U16(Vec<u16>),
    /// Floating-point samples in `[0, 1]`; values outside are clamped.
    F32(Vec<f32>),
}

impl Samples {
    /// Number of samples stored.
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::U16(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    /// `true` when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_u8_range(&self, range: Range<usize>) -> Vec<u8> {
        match self {
            Self::U8(v) => v[range].to_vec(),
            Self::U16(v) => v[range].iter().map(|&s| u16_to_u8(s)).collect(),
            Self::F32(v) => v[range].iter().map(|&s| unit_to_u8(s)).collect(),
        }
    }
}

/// A raw sample array with its shape.
///
/// Accepted ranks:
/// - 2: `(H, W)` single channel
/// - 3: `(H, W, C)` or `(C, H, W)`
/// - 4: a batch of rank-3 images; only the first element is used
#[derive(Clone, Debug, PartialEq)]
pub struct SampleArray {
    /// Dimensions, outermost first.
    pub shape: Vec<usize>,
    /// Flattened samples in row-major order of `shape`.
    pub samples: Samples,
    /// Channel axis position. Inferred from the shape when `None`.
    pub layout: Option<ChannelLayout>,
}

impl SampleArray {
    /// Build a sample array with an inferred channel layout.
    pub fn new(shape: Vec<usize>, samples: Samples) -> Self {
        Self {
            shape,
            samples,
            layout: None,
        }
    }

    /// Set an explicit channel layout.
    pub fn with_layout(mut self, layout: ChannelLayout) -> Self {
        self.layout = Some(layout);
        self
    }
}

/// Any image representation the engine accepts.
#[derive(Clone, Debug)]
pub enum ImageInput {
    /// Raw samples with shape and dtype.
    Samples(SampleArray),
    /// A buffer that is already canonical; passed through unchanged.
    Canonical(PixelBuffer),
}

impl From<SampleArray> for ImageInput {
    fn from(value: SampleArray) -> Self {
        Self::Samples(value)
    }
}

impl From<PixelBuffer> for ImageInput {
    fn from(value: PixelBuffer) -> Self {
        Self::Canonical(value)
    }
}

impl From<image::DynamicImage> for ImageInput {
    fn from(img: image::DynamicImage) -> Self {
        use image::DynamicImage as D;
        let (width, height) = (img.width(), img.height());
        let (shape, samples) = match img {
            D::ImageRgb32F(_) | D::ImageRgba32F(_) => {
                let raw = img.into_rgba32f().into_raw();
                (rgba_shape(width, height), Samples::F32(raw))
            }
            D::ImageLuma16(_) | D::ImageLumaA16(_) | D::ImageRgb16(_) | D::ImageRgba16(_) => {
                let raw = img.into_rgba16().into_raw();
                (rgba_shape(width, height), Samples::U16(raw))
            }
            other => {
                let raw = other.into_rgba8().into_raw();
                (rgba_shape(width, height), Samples::U8(raw))
            }
        };
        Self::Samples(SampleArray::new(shape, samples).with_layout(ChannelLayout::Last))
    }
}

fn rgba_shape(width: u32, height: u32) -> Vec<usize> {
    vec![height as usize, width as usize, CHANNELS]
}

/// Convert any accepted image representation into a canonical [`PixelBuffer`].
///
/// Channel rules: one channel is replicated into R, G and B; three channels get an opaque alpha;
/// four channels pass through. Batched inputs keep only their first element.
pub fn canonicalize(input: impl Into<ImageInput>) -> LayerstackResult<PixelBuffer> {
    match input.into() {
        ImageInput::Canonical(buf) if buf.size().is_empty() => {
            Err(LayerstackError::unsupported_shape(format!(
                "zero-sized image {}x{}",
                buf.width(),
                buf.height()
            )))
        }
        ImageInput::Canonical(buf) => Ok(buf),
        ImageInput::Samples(arr) => canonicalize_samples(&arr),
    }
}

#[derive(Clone, Copy, Debug)]
struct ImageGeometry {
    height: usize,
    width: usize,
    channels: usize,
    layout: ChannelLayout,
}

fn canonicalize_samples(arr: &SampleArray) -> LayerstackResult<PixelBuffer> {
    let rank = arr.shape.len();
    if !(2..=4).contains(&rank) {
        return Err(LayerstackError::unsupported_shape(format!(
            "rank {rank} (shape {:?}) is outside 2..=4",
            arr.shape
        )));
    }

    let total = arr
        .shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| LayerstackError::unsupported_shape("sample count overflow"))?;
    if total != arr.samples.len() {
        return Err(LayerstackError::unsupported_shape(format!(
            "shape {:?} needs {total} samples, got {}",
            arr.shape,
            arr.samples.len()
        )));
    }

    let image_shape = if rank == 4 {
        let batch = arr.shape[0];
        if batch == 0 {
            return Err(LayerstackError::unsupported_shape("empty batch"));
        }
        if batch > 1 {
            tracing::warn!(
                batch,
                discarded = batch - 1,
                "batched image input: keeping the first element only"
            );
        }
        &arr.shape[1..]
    } else {
        &arr.shape[..]
    };

    let geom = resolve_geometry(image_shape, arr.layout)?;
    let elem_len = geom.height * geom.width * geom.channels;
    let src = arr.samples.to_u8_range(0..elem_len);

    let width = u32::try_from(geom.width)
        .map_err(|_| LayerstackError::unsupported_shape("width exceeds u32"))?;
    let height = u32::try_from(geom.height)
        .map_err(|_| LayerstackError::unsupported_shape("height exceeds u32"))?;

    let plane = geom.height * geom.width;
    let mut out = Vec::with_capacity(plane * CHANNELS);
    for p in 0..plane {
        let sample = |k: usize| match geom.layout {
            ChannelLayout::Last => src[p * geom.channels + k],
            ChannelLayout::First => src[k * plane + p],
        };
        match geom.channels {
            1 => {
                let v = sample(0);
                out.extend_from_slice(&[v, v, v, u8::MAX]);
            }
            3 => out.extend_from_slice(&[sample(0), sample(1), sample(2), u8::MAX]),
            _ => out.extend_from_slice(&[sample(0), sample(1), sample(2), sample(3)]),
        }
    }

    PixelBuffer::from_rgba8(width, height, out)
}

fn resolve_geometry(
    shape: &[usize],
    hint: Option<ChannelLayout>,
) -> LayerstackResult<ImageGeometry> {
    let geom = match shape {
        [h, w] => ImageGeometry {
            height: *h,
            width: *w,
            channels: 1,
            layout: ChannelLayout::Last,
        },
        [a, b, c] => {
            let layout = match hint {
                Some(layout) => layout,
                None if is_channel_count(*c) => ChannelLayout::Last,
                None if is_channel_count(*a) => ChannelLayout::First,
                None => {
                    return Err(LayerstackError::unsupported_shape(format!(
                        "no channel axis of size 1, 3 or 4 in shape {shape:?}"
                    )));
                }
            };
            match layout {
                ChannelLayout::Last => ImageGeometry {
                    height: *a,
                    width: *b,
                    channels: *c,
                    layout,
                },
                ChannelLayout::First => ImageGeometry {
                    height: *b,
                    width: *c,
                    channels: *a,
                    layout,
                },
            }
        }
        _ => {
            return Err(LayerstackError::unsupported_shape(format!(
                "image shape {shape:?} must have rank 2 or 3"
            )));
        }
    };

    if !is_channel_count(geom.channels) {
        return Err(LayerstackError::unsupported_shape(format!(
            "{} channels; expected 1, 3 or 4",
            geom.channels
        )));
    }
    if geom.width == 0 || geom.height == 0 {
        return Err(LayerstackError::unsupported_shape(format!(
            "zero-sized image {}x{}",
            geom.width, geom.height
        )));
    }
    Ok(geom)
}

fn is_channel_count(c: usize) -> bool {
    matches!(c, 1 | 3 | 4)
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/adapter.rs"]
mod tests;
