//! ciffcaff decodes CIFF still images and CAFF animation containers and exports frames as JPEG.
//!
//! # Pipeline overview
//!
//! 1. **Read**: every byte goes through a [`StreamReader`], which keeps an overflow-checked count
//!    so each nesting level can compare declared lengths with what it actually consumed.
//! 2. **Decode**: [`decode_ciff`] parses a still image; [`CaffReader`] walks container blocks
//!    and decodes the embedded CIFF of the first animation block.
//! 3. **Export**: the decoded RGB plane goes to an [`ImageSink`]; [`JpegFileSink`] encodes it
//!    with the `image` crate and writes `<input>.jpg`.
//!
//! All multi-byte integers are little-endian. Any validation failure aborts the whole operation
//! with a [`CaffError`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod export;
mod foundation;

/// Entry points used by the CLI.
pub mod convert;

pub use codec::caff::{
    BlockId, CAFF_CREDITS_FIXED_LEN, CAFF_HEADER_LEN, CAFF_MAGIC, CaffAnimation, CaffBlock,
    CaffCredits, CaffHeader, CaffReader, CaffSummary, CreditsDate, ReaderState, decode_caff,
};
pub use codec::ciff::{CIFF_FIXED_HEADER_LEN, CIFF_MAGIC, CiffImage, DecodedCiff, decode_ciff};
pub use convert::{
    ConvertOpts, ConvertReport, InputKind, InspectReport, MAX_PATH_LEN, convert_file,
    derive_output_path, inspect_file, validate_input_path,
};
pub use export::jpeg::{JPEG_MAX_DIMENSION, JpegFileSink, JpegOpts, encode_jpeg};
pub use export::sink::{ExportedFrame, ImageSink, InMemorySink, RgbFrame};
pub use foundation::error::{CaffError, CaffResult};
pub use foundation::io::{StreamReader, checked_add, safe_copy, safe_read};
pub use foundation::limits::DecodeLimits;
