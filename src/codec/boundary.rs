use crate::composite::cpu::composite;
use crate::document::blend::BlendMode;
use crate::document::stack::Document;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::pixel::buffer::PixelBuffer;

/// Colour model handed to document codecs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColorMode {
    /// 8-bit RGB plus alpha.
    #[default]
    Rgba8,
}

/// Document-level metadata passed to a [`DocumentWriter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Bounding canvas.
    pub canvas: Canvas,
    /// Pixel colour model of every layer.
    pub color_mode: ColorMode,
}

/// One layer as handed to a [`DocumentWriter`], bottom of the stack first.
#[derive(Clone, Copy, Debug)]
pub struct EncodeLayer<'a> {
    /// Canonical straight-alpha RGBA8 pixels, anchored at the canvas origin.
    pub pixels: &'a PixelBuffer,
    /// Layer name.
    pub name: &'a str,
    /// Blend mode tag.
    pub blend_mode: BlendMode,
    /// Opacity on the 8-bit scale (rounded to nearest).
    pub opacity: u8,
}

/// One layer reconstructed by a [`DocumentReader`].
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedLayer {
    /// Canonical pixels anchored at the canvas origin.
    pub pixels: PixelBuffer,
    /// Layer name.
    pub name: String,
    /// Blend mode tag.
    pub blend_mode: BlendMode,
    /// Opacity on the 8-bit scale.
    pub opacity: u8,
}

/// Output of a [`DocumentReader`], bottom layer first.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedDocument {
    /// Stored canvas size.
    pub canvas: Canvas,
    /// Layers, bottom to top.
    pub layers: Vec<DecodedLayer>,
}

/// Capability that encodes a layer stack into a layered-document byte stream.
///
/// Implementations own every binary-format detail. Failures should be reported as
/// [`LayerstackError::Codec`].
pub trait DocumentWriter {
    /// Encode `layers` (bottom first) plus the flattened `composite` preview.
    fn encode_layered_document(
        &mut self,
        header: &DocumentHeader,
        layers: &[EncodeLayer<'_>],
        composite: &PixelBuffer,
    ) -> LayerstackResult<Vec<u8>>;
}

/// Capability that reconstructs a layer stack from a layered-document byte stream.
pub trait DocumentReader {
    /// Decode `bytes` into a canvas and layer list (bottom first).
    fn decode_layered_document(&mut self, bytes: &[u8]) -> LayerstackResult<DecodedDocument>;
}

/// Flatten `document` and hand it, with its ordered layer list, to `writer`.
#[tracing::instrument(skip(document, writer), fields(layers = document.len()))]
pub fn serialize<W: DocumentWriter + ?Sized>(
    document: &Document,
    writer: &mut W,
) -> LayerstackResult<Vec<u8>> {
    if document.is_empty() {
        return Err(LayerstackError::empty_document(
            "cannot serialize a document with no layers",
        ));
    }
    let flattened = composite(document)?;
    let header = DocumentHeader {
        canvas: document.canvas_size(),
        color_mode: ColorMode::Rgba8,
    };
    let layers: Vec<EncodeLayer<'_>> = document
        .layers()
        .iter()
        .map(|l| EncodeLayer {
            pixels: l.pixels(),
            name: l.name(),
            blend_mode: l.blend_mode(),
            opacity: l.opacity().to_u8(),
        })
        .collect();

    let bytes = writer.encode_layered_document(&header, &layers, &flattened)?;
    tracing::debug!(bytes = bytes.len(), "document encoded");
    Ok(bytes)
}

/// Decode `bytes` with `reader` and rebuild a [`Document`].
pub fn deserialize<R: DocumentReader + ?Sized>(
    bytes: &[u8],
    reader: &mut R,
) -> LayerstackResult<Document> {
    let decoded = reader.decode_layered_document(bytes)?;
    Ok(Document::from_decoded(decoded))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/boundary.rs"]
mod tests;
