use rayon::prelude::*;

use crate::composite::ops::{RgbaF32, composite_pixel};
use crate::document::layer::Layer;
use crate::document::stack::Document;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::foundation::math::unit_to_u8;
use crate::pixel::buffer::{CHANNELS, PixelBuffer};

/// Threading controls for flattening.
///
/// Parallel mode splits canvas rows across a `rayon` pool. Each row is computed independently
/// in the same per-pixel order, so the output is byte-identical to serial mode.
#[derive(Clone, Debug, Default)]
pub struct CompositeOpts {
    /// Enable row-parallel compositing when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count (parallel mode only).
    pub threads: Option<usize>,
}

/// Flatten `document` into one RGBA8 raster sized to its canvas.
///
/// Layers are applied bottom to top, each anchored at the origin. An empty document is
/// rejected with [`LayerstackError::EmptyDocument`].
pub fn composite(document: &Document) -> LayerstackResult<PixelBuffer> {
    composite_with(document, &CompositeOpts::default())
}

/// [`composite`] with explicit threading options.
#[tracing::instrument(skip(document, opts), fields(layers = document.len(), parallel = opts.parallel))]
pub fn composite_with(document: &Document, opts: &CompositeOpts) -> LayerstackResult<PixelBuffer> {
    if document.is_empty() {
        return Err(LayerstackError::empty_document(
            "cannot composite a document with no layers",
        ));
    }
    let canvas = document.canvas_size();
    if canvas.is_empty() {
        return Err(LayerstackError::empty_document(format!(
            "cannot composite a {}x{} canvas",
            canvas.width, canvas.height
        )));
    }

    let width = canvas.width as usize;
    let layers = document.layers();
    let mut acc: Vec<RgbaF32> = vec![[0.0; 4]; canvas.pixel_count()];

    if opts.parallel {
        let pool = build_pool(opts.threads)?;
        pool.install(|| {
            acc.par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| composite_row(layers, y, row));
        });
    } else {
        acc.chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| composite_row(layers, y, row));
    }

    let mut out = Vec::with_capacity(acc.len() * CHANNELS);
    for px in &acc {
        if px[3] <= 0.0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
        } else {
            out.extend_from_slice(&px.map(unit_to_u8));
        }
    }
    PixelBuffer::from_rgba8(canvas.width, canvas.height, out)
}

fn composite_row(layers: &[Layer], y: usize, row: &mut [RgbaF32]) {
    for layer in layers {
        let pixels = layer.pixels();
        let Some(src) = u32::try_from(y).ok().and_then(|y| pixels.row(y)) else {
            continue;
        };
        let opacity = f32::from(layer.opacity().to_u8()) / 255.0;
        if opacity <= 0.0 {
            continue;
        }
        let mode = layer.blend_mode();
        for (dst, s) in row.iter_mut().zip(src.chunks_exact(CHANNELS)) {
            composite_pixel(dst, [s[0], s[1], s[2], s[3]], mode, opacity);
        }
    }
}

fn build_pool(threads: Option<usize>) -> LayerstackResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(LayerstackError::validation("threads must be > 0"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LayerstackError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/composite/cpu.rs"]
mod tests;
