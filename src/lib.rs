#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Layerstack: stack raster images into layered documents.
//!
//! Images of any supported sample layout are normalized into one canonical straight-alpha
//! RGBA8 buffer, appended to a [`Document`] with a name, [`BlendMode`] and [`Opacity`], and then
//! either flattened with [`composite`] or handed to a [`DocumentWriter`] such as [`PsdCodec`].
//!
//! Layers are stacked bottom first and anchored at the canvas origin; the canvas grows to the
//! running maximum of every layer's width and height.
//!
//! ```no_run
//! use layerstack::{BlendMode, Document, PixelBuffer, PsdCodec, SaveOpts, save_document};
//!
//! # fn main() -> layerstack::LayerstackResult<()> {
//! let mut doc = Document::new();
//! doc.append(PixelBuffer::filled(100, 50, [255, 0, 0, 255])?, "bg", BlendMode::Normal, 1.0)?;
//! doc.append(PixelBuffer::filled(50, 50, [0, 255, 0, 255])?, "fg", BlendMode::Normal, 0.5)?;
//! let path = save_document(&doc, &SaveOpts::default(), &mut PsdCodec::new())?;
//! println!("{}", path.display());
//! # Ok(())
//! # }
//! ```

mod codec;
mod composite;
mod document;
mod foundation;
mod host;
mod output;
mod pixel;

pub use codec::boundary::{
    ColorMode, DecodedDocument, DecodedLayer, DocumentHeader, DocumentReader, DocumentWriter,
    EncodeLayer, deserialize, serialize,
};
pub use codec::memory::{InMemoryCodec, RecordedLayer};
pub use codec::psd::{MAX_PSD_DIMENSION, PSD_EXTENSION, PsdCodec};
pub use composite::cpu::{CompositeOpts, composite, composite_with};
pub use composite::ops::{RgbaF32, blend_rgb, composite_pixel};
pub use document::blend::BlendMode;
pub use document::layer::{Layer, Opacity};
pub use document::stack::Document;
pub use foundation::core::Canvas;
pub use foundation::error::{LayerstackError, LayerstackResult};
pub use host::manifest::{DocumentManifest, LayerEntry};
pub use host::ops::{
    SaveOpts, append_layer, composite_preview, save_document, save_preview_png,
    save_preview_png_with,
};
pub use output::path::{MAX_PATH_PROBES, create_output_file, ensure_dir, resolve_output_path};
pub use pixel::adapter::{ChannelLayout, ImageInput, SampleArray, Samples, canonicalize};
pub use pixel::buffer::{CHANNELS, PixelBuffer};
