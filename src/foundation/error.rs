use std::path::PathBuf;

/// Convenience result type used across layerstack.
pub type LayerstackResult<T> = Result<T, LayerstackError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum LayerstackError {
    /// The pixel adapter could not interpret the channel/rank layout of an input image.
    #[error("unsupported image shape: {0}")]
    UnsupportedImageShape(String),

    /// A composite or save was requested on a document without layers.
    #[error("empty document: {0}")]
    EmptyDocument(String),

    /// A blend-mode name did not match any known mode.
    #[error("unknown blend mode: '{0}'")]
    UnknownBlendMode(String),

    /// The collision-avoiding output path probe hit its cap.
    #[error(
        "output path resolution exhausted after {probes} probes for '{base}' in '{}'",
        directory.display()
    )]
    PathResolutionExhausted {
        /// Directory that was probed.
        directory: PathBuf,
        /// Base filename without suffix or extension.
        base: String,
        /// Number of candidate paths tried.
        probes: usize,
    },

    /// The layered-document writer or reader rejected its input.
    #[error("codec error: {0}")]
    Codec(String),

    /// Invalid user-provided arguments or manifest data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerstackError {
    /// Build a [`LayerstackError::UnsupportedImageShape`] value.
    pub fn unsupported_shape(msg: impl Into<String>) -> Self {
        Self::UnsupportedImageShape(msg.into())
    }

    /// Build a [`LayerstackError::EmptyDocument`] value.
    pub fn empty_document(msg: impl Into<String>) -> Self {
        Self::EmptyDocument(msg.into())
    }

    /// Build a [`LayerstackError::UnknownBlendMode`] value.
    pub fn unknown_blend_mode(name: impl Into<String>) -> Self {
        Self::UnknownBlendMode(name.into())
    }

    /// Build a [`LayerstackError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Build a [`LayerstackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
