//! Output file placement.

/// Collision-avoiding output path resolution.
pub mod path;
