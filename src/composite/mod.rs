//! Flattening a document into one raster.

/// CPU compositor over a [`Document`](crate::Document).
pub mod cpu;
/// Per-pixel blend and alpha-over math.
pub mod ops;
