//! Format decoders.

/// CAFF animation container block reader.
pub mod caff;
/// CIFF still-image decoder.
pub mod ciff;
