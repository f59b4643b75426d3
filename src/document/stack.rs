use crate::codec::boundary::DecodedDocument;
use crate::document::blend::BlendMode;
use crate::document::layer::{Layer, Opacity};
use crate::foundation::core::Canvas;
use crate::foundation::error::LayerstackResult;
use crate::pixel::adapter::{ImageInput, canonicalize};

/// An ordered stack of layers plus the canvas that bounds them.
///
/// Stacking order: the first appended layer is the bottom of the stack; [`Document::layers`]
/// iterates bottom to top. Every layer is anchored at the canvas origin.
///
/// `Clone` is cheap (pixel data is shared) and yields an immutable snapshot that can be
/// composited or serialized while the original keeps growing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    layers: Vec<Layer>,
    canvas: Canvas,
}

impl Document {
    /// An empty document with a `(0, 0)` canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize `image`, push it on top of the stack, and grow the canvas to fit.
    ///
    /// Only adapter failures are reported; on error the document is left unmodified. An empty
    /// or whitespace-only `name` is replaced with `"Layer N"` (1-based stack position).
    pub fn append(
        &mut self,
        image: impl Into<ImageInput>,
        name: impl Into<String>,
        blend_mode: BlendMode,
        opacity: impl Into<Opacity>,
    ) -> LayerstackResult<&Layer> {
        let pixels = canonicalize(image)?;

        let mut name = name.into();
        if name.trim().is_empty() {
            name = format!("Layer {}", self.layers.len() + 1);
            tracing::warn!(name = %name, "empty layer name replaced");
        }

        let layer = Layer::new(pixels, name, blend_mode, opacity.into());
        Ok(self.push_layer(layer))
    }

    fn push_layer(&mut self, layer: Layer) -> &Layer {
        self.canvas = self.canvas.union(layer.size());
        tracing::debug!(
            name = layer.name(),
            width = layer.size().width,
            height = layer.size().height,
            blend_mode = %layer.blend_mode(),
            opacity = layer.opacity().get(),
            canvas_width = self.canvas.width,
            canvas_height = self.canvas.height,
            "layer appended"
        );
        self.layers.push(layer);
        &self.layers[self.layers.len() - 1]
    }

    /// Bounding canvas: running maximum of every layer's width and height.
    pub fn canvas_size(&self) -> Canvas {
        self.canvas
    }

    /// Layers, bottom to top, in append order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// `true` when no layer has been appended.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Rebuild a document from a decoded layered file.
    ///
    /// The canvas is the larger of the stored canvas and the running layer maximum.
    pub fn from_decoded(decoded: DecodedDocument) -> Self {
        let mut doc = Self {
            layers: Vec::with_capacity(decoded.layers.len()),
            canvas: decoded.canvas,
        };
        for l in decoded.layers {
            doc.push_layer(Layer::new(
                l.pixels,
                l.name,
                l.blend_mode,
                Opacity::from_u8(l.opacity),
            ));
        }
        doc
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/stack.rs"]
mod tests;
