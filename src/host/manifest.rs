use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::document::blend::BlendMode;
use crate::document::stack::Document;
use crate::foundation::error::{LayerstackError, LayerstackResult};
use crate::host::ops::SaveOpts;

/// JSON description of a document to build: output placement plus image files to stack.
///
/// Layers are listed bottom first. Relative `path`s are resolved against the root passed to
/// [`DocumentManifest::load_document`], normally the manifest's own directory.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentManifest {
    /// Output placement used by `save`.
    #[serde(default)]
    pub output: SaveOpts,
    /// Layers, bottom to top.
    pub layers: Vec<LayerEntry>,
}

/// One manifest layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerEntry {
    /// Image file decoded with the `image` crate.
    pub path: PathBuf,
    /// Layer name; blank names become `"Layer N"`.
    #[serde(default)]
    pub name: String,
    /// Blend mode name, parsed like [`BlendMode`]'s `FromStr`.
    #[serde(default = "default_blend_mode")]
    pub blend_mode: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_blend_mode() -> String {
    "normal".to_string()
}

fn default_opacity() -> f32 {
    1.0
}

impl DocumentManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json_str(s: &str) -> LayerstackResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| LayerstackError::validation(format!("parse manifest JSON: {e}")))
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LayerstackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LayerstackError::validation(format!("open manifest '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            LayerstackError::validation(format!("parse manifest '{}': {e}", path.display()))
        })
    }

    /// Check manifest invariants without touching any image file.
    pub fn validate(&self) -> LayerstackResult<()> {
        if self.layers.is_empty() {
            return Err(LayerstackError::validation(
                "manifest must list at least one layer",
            ));
        }
        let filename = &self.output.filename;
        if filename.trim().is_empty() {
            return Err(LayerstackError::validation("output.filename must be non-empty"));
        }
        if filename.contains(['/', '\\']) {
            return Err(LayerstackError::validation(format!(
                "output.filename '{filename}' must not contain path separators"
            )));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.path.as_os_str().is_empty() {
                return Err(LayerstackError::validation(format!(
                    "layers[{i}].path must be non-empty"
                )));
            }
            if !layer.opacity.is_finite() || !(0.0..=1.0).contains(&layer.opacity) {
                return Err(LayerstackError::validation(format!(
                    "layers[{i}].opacity must be within [0, 1], got {}",
                    layer.opacity
                )));
            }
            layer.blend_mode.parse::<BlendMode>()?;
        }
        Ok(())
    }

    /// Validate, decode every layer image, and append them in order.
    pub fn load_document(&self, root: &Path) -> LayerstackResult<Document> {
        self.validate()?;

        let mut doc = Document::new();
        for layer in &self.layers {
            let path = resolve(root, &layer.path);
            let img = image::open(&path)
                .with_context(|| format!("failed to decode layer image '{}'", path.display()))?;
            let mode: BlendMode = layer.blend_mode.parse()?;
            doc.append(img, layer.name.as_str(), mode, layer.opacity)?;
        }
        Ok(doc)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/manifest.rs"]
mod tests;
