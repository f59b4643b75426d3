//! The layer stack: blend modes, immutable layers, and the document that owns them.

/// Blend-mode enumeration and name/key lookups.
pub mod blend;
/// Immutable layer record and opacity.
pub mod layer;
/// Ordered layer stack with derived canvas.
pub mod stack;
