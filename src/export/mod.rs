//! Export adapters.
//!
//! Decoders hand frames to an [`sink::ImageSink`]; the JPEG sink encodes them with the `image`
//! crate and writes the result to disk.

/// JPEG encoding and the file-backed sink.
pub mod jpeg;
/// Frame sink trait and built-in sinks.
pub mod sink;
