//! Canonical pixel storage and the adapter that normalizes raw inputs into it.

/// Input normalization (channel expansion, range scaling, batch handling).
pub mod adapter;
/// Canonical straight-alpha RGBA8 buffer.
pub mod buffer;
