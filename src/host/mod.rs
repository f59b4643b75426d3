//! Host-facing operations and the JSON document manifest.

/// JSON manifest describing a document to build.
pub mod manifest;
/// Append, save, and preview entry points.
pub mod ops;
