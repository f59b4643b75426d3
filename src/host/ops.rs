use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::codec::boundary::{DocumentWriter, serialize};
use crate::codec::psd::PSD_EXTENSION;
use crate::composite::cpu::{CompositeOpts, composite, composite_with};
use crate::document::blend::BlendMode;
use crate::document::layer::Opacity;
use crate::document::stack::Document;
use crate::foundation::error::LayerstackResult;
use crate::output::path::{create_output_file, ensure_dir};
use crate::pixel::adapter::ImageInput;
use crate::pixel::buffer::PixelBuffer;

/// Where and how [`save_document`] writes its file.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SaveOpts {
    /// Target directory, created when missing.
    pub directory: PathBuf,
    /// File stem without extension.
    pub filename: String,
    /// Replace `filename.psd` instead of picking the next free `_N` suffix.
    pub overwrite: bool,
}

impl Default for SaveOpts {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            filename: "output".to_string(),
            overwrite: false,
        }
    }
}

/// Append `image` as a new top layer, creating a document when none is given.
///
/// `blend_mode` is parsed by name (see [`BlendMode`]'s `FromStr`); an unknown name fails with
/// [`crate::LayerstackError::UnknownBlendMode`] before the image is touched.
pub fn append_layer(
    document: Option<Document>,
    image: impl Into<ImageInput>,
    name: &str,
    blend_mode: &str,
    opacity: f32,
) -> LayerstackResult<Document> {
    let mode: BlendMode = blend_mode.parse()?;
    let mut doc = document.unwrap_or_default();
    doc.append(image, name, mode, Opacity::new(opacity))?;
    Ok(doc)
}

/// Serialize `document` with `writer` and write it to a freshly claimed `.psd` path.
///
/// Returns the path that was written.
#[tracing::instrument(skip(document, writer), fields(layers = document.len()))]
pub fn save_document<W: DocumentWriter + ?Sized>(
    document: &Document,
    opts: &SaveOpts,
    writer: &mut W,
) -> LayerstackResult<PathBuf> {
    let bytes = serialize(document, writer)?;
    let (path, file) =
        create_output_file(&opts.directory, &opts.filename, PSD_EXTENSION, opts.overwrite)?;
    write_or_discard(&path, file, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "document saved");
    Ok(path)
}

/// Write `bytes` to `out`, removing the file at `path` if the write fails.
fn write_or_discard<W: std::io::Write>(
    path: &Path,
    mut out: W,
    bytes: &[u8],
) -> LayerstackResult<()> {
    if let Err(e) = out.write_all(bytes).and_then(|()| out.flush()) {
        drop(out);
        let _ = std::fs::remove_file(path);
        return Err(anyhow::Error::new(e)
            .context(format!("failed to write '{}'", path.display()))
            .into());
    }
    Ok(())
}

/// Flatten `document` for display.
pub fn composite_preview(document: &Document) -> LayerstackResult<PixelBuffer> {
    composite(document)
}

/// Flatten `document` and write the result as a PNG at `path`.
pub fn save_preview_png(document: &Document, path: &Path) -> LayerstackResult<()> {
    save_preview_png_with(document, path, &CompositeOpts::default())
}

/// [`save_preview_png`] with explicit threading options. Missing parent directories are created.
pub fn save_preview_png_with(
    document: &Document,
    path: &Path,
    opts: &CompositeOpts,
) -> LayerstackResult<()> {
    let flattened = composite_with(document, opts)?;
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    flattened
        .to_rgba_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write preview '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/host/ops.rs"]
mod tests;
