use crate::codec::boundary::{
    ColorMode, DecodedDocument, DecodedLayer, DocumentHeader, DocumentReader, DocumentWriter,
    EncodeLayer,
};
use crate::document::blend::BlendMode;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::pixel::buffer::PixelBuffer;

#[derive(serde::Serialize, serde::Deserialize)]
struct WireDocument {
    canvas: Canvas,
    color_mode: ColorMode,
    layers: Vec<WireLayer>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct WireLayer {
    name: String,
    blend_mode: BlendMode,
    opacity: u8,
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Summary of one layer seen by [`InMemoryCodec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedLayer {
    /// Layer name.
    pub name: String,
    /// Blend mode tag.
    pub blend_mode: BlendMode,
    /// 8-bit opacity.
    pub opacity: u8,
    /// Layer extents.
    pub size: Canvas,
}

/// Codec for tests and debugging.
///
/// Records the last encode call and round-trips through a JSON form of the layer stack. It can
/// also be configured to fail every call.
#[derive(Debug, Default)]
pub struct InMemoryCodec {
    header: Option<DocumentHeader>,
    layers: Vec<RecordedLayer>,
    composite: Option<PixelBuffer>,
    failure: Option<String>,
}

impl InMemoryCodec {
    /// Create a new in-memory codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// A codec whose every call fails with [`LayerstackError::Codec`].
    pub fn failing(msg: impl Into<String>) -> Self {
        Self {
            failure: Some(msg.into()),
            ..Self::default()
        }
    }

    /// Header captured by the last encode, if any.
    pub fn header(&self) -> Option<DocumentHeader> {
        self.header
    }

    /// Layers captured by the last encode, bottom first.
    pub fn layers(&self) -> &[RecordedLayer] {
        &self.layers
    }

    /// Composite captured by the last encode, if any.
    pub fn composite(&self) -> Option<&PixelBuffer> {
        self.composite.as_ref()
    }

    fn check_failure(&self) -> LayerstackResult<()> {
        match &self.failure {
            Some(msg) => Err(LayerstackError::codec(msg.clone())),
            None => Ok(()),
        }
    }
}

impl DocumentWriter for InMemoryCodec {
    fn encode_layered_document(
        &mut self,
        header: &DocumentHeader,
        layers: &[EncodeLayer<'_>],
        composite: &PixelBuffer,
    ) -> LayerstackResult<Vec<u8>> {
        self.check_failure()?;

        self.header = Some(*header);
        self.composite = Some(composite.clone());
        self.layers = layers
            .iter()
            .map(|l| RecordedLayer {
                name: l.name.to_string(),
                blend_mode: l.blend_mode,
                opacity: l.opacity,
                size: l.pixels.size(),
            })
            .collect();

        let wire = WireDocument {
            canvas: header.canvas,
            color_mode: header.color_mode,
            layers: layers
                .iter()
                .map(|l| WireLayer {
                    name: l.name.to_string(),
                    blend_mode: l.blend_mode,
                    opacity: l.opacity,
                    width: l.pixels.width(),
                    height: l.pixels.height(),
                    rgba: l.pixels.as_bytes().to_vec(),
                })
                .collect(),
        };
        serde_json::to_vec(&wire).map_err(|e| LayerstackError::codec(e.to_string()))
    }
}

impl DocumentReader for InMemoryCodec {
    fn decode_layered_document(&mut self, bytes: &[u8]) -> LayerstackResult<DecodedDocument> {
        self.check_failure()?;

        let wire: WireDocument =
            serde_json::from_slice(bytes).map_err(|e| LayerstackError::codec(e.to_string()))?;
        let mut layers = Vec::with_capacity(wire.layers.len());
        for l in wire.layers {
            let pixels = PixelBuffer::from_rgba8(l.width, l.height, l.rgba)
                .map_err(|e| LayerstackError::codec(format!("layer '{}': {e}", l.name)))?;
            layers.push(DecodedLayer {
                pixels,
                name: l.name,
                blend_mode: l.blend_mode,
                opacity: l.opacity,
            });
        }
        Ok(DecodedDocument {
            canvas: wire.canvas,
            layers,
        })
    }
}
