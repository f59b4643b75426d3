//! Layered-document codec boundary and the bundled codecs.

/// Writer/reader traits plus `serialize` / `deserialize`.
pub mod boundary;
/// JSON-backed codec that records what it was handed.
pub mod memory;
/// Minimal uncompressed PSD codec.
pub mod psd;
