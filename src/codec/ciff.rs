//! CIFF still-image decoding.
//!
//! Layout (little-endian):
//!
//! ```text
//! "CIFF" | header_size u64 | content_size u64 | width u64 | height u64
//!        | caption ... '\n' | (tag ... '\0')* | pixels[content_size]
//! ```
//!
//! `header_size` counts everything before the pixels, magic included.

use std::io::Read;

use serde::Serialize;

use crate::foundation::{
    error::{CaffError, CaffResult},
    io::{StreamReader, safe_copy},
    limits::DecodeLimits,
};

/// Magic bytes opening every CIFF image.
pub const CIFF_MAGIC: &[u8; 4] = b"CIFF";

/// Magic + four `u64` fields.
pub const CIFF_FIXED_HEADER_LEN: u64 = 4 + 4 * 8;

const PIXEL_CHUNK: usize = 64 * 1024;

/// A fully decoded CIFF image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CiffImage {
    /// Declared header length in bytes.
    pub header_size: u64,
    /// Declared pixel plane length in bytes.
    pub content_size: u64,
    /// Width in pixels.
    pub width: u64,
    /// Height in pixels.
    pub height: u64,
    /// Caption, without its newline terminator.
    pub caption: String,
    /// Tags in file order, without NUL terminators.
    pub tags: Vec<String>,
    /// Interleaved RGB, row-major, `content_size` bytes.
    #[serde(skip)]
    pub pixels: Vec<u8>,
}

/// A decoded image plus the number of stream bytes it occupied.
#[derive(Clone, Debug)]
pub struct DecodedCiff {
    /// The image.
    pub image: CiffImage,
    /// Bytes consumed from the stream, header and pixels.
    pub consumed: u64,
}

/// Decode one CIFF image starting at the current stream position.
pub fn decode_ciff<R: Read>(
    src: &mut StreamReader<R>,
    limits: &DecodeLimits,
) -> CaffResult<DecodedCiff> {
    let start = src.consumed();

    let mut magic = [0u8; 4];
    src.read_exact(&mut magic)?;
    if &magic != CIFF_MAGIC {
        return Err(CaffError::BadMagic {
            expected: *CIFF_MAGIC,
            found: magic,
        });
    }

    let header_size = src.read_u64_le()?;
    let content_size = src.read_u64_le()?;
    let width = src.read_u64_le()?;
    let height = src.read_u64_le()?;

    let expected = width.checked_mul(height).and_then(|px| px.checked_mul(3));
    if expected != Some(content_size) {
        return Err(CaffError::SizeMismatch {
            content_size,
            width,
            height,
        });
    }
    if content_size > limits.max_pixel_bytes {
        return Err(CaffError::capacity(content_size, limits.max_pixel_bytes));
    }

    let caption = read_caption(src, start, header_size)?;

    let mut tags = Vec::new();
    while src.consumed_since(start) < header_size {
        tags.push(read_tag(src, start, header_size)?);
    }

    let consumed = src.consumed_since(start);
    if consumed != header_size {
        return Err(CaffError::HeaderLengthMismatch {
            declared: header_size,
            consumed,
        });
    }

    tracing::debug!(
        header_size,
        content_size,
        width,
        height,
        tags = tags.len(),
        "ciff header"
    );

    let pixels = read_pixels(src, content_size)?;

    Ok(DecodedCiff {
        image: CiffImage {
            header_size,
            content_size,
            width,
            height,
            caption,
            tags,
            pixels,
        },
        consumed: src.consumed_since(start),
    })
}

fn read_caption<R: Read>(
    src: &mut StreamReader<R>,
    start: u64,
    header_size: u64,
) -> CaffResult<String> {
    let mut buf = Vec::new();
    loop {
        let b = src.read_u8()?;
        ensure_within_header(src, start, header_size)?;
        if b == b'\n' {
            break;
        }
        buf.push(b);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn read_tag<R: Read>(
    src: &mut StreamReader<R>,
    start: u64,
    header_size: u64,
) -> CaffResult<String> {
    let mut buf = Vec::new();
    loop {
        let b = src.read_u8()?;
        // A newline is rejected as such even where the declared header has already ended.
        if b == b'\n' {
            return Err(CaffError::MultilineTag);
        }
        ensure_within_header(src, start, header_size)?;
        if b == b'\0' {
            break;
        }
        buf.push(b);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

// Caption and tag bytes all belong to the header, so reading past it is already a mismatch.
fn ensure_within_header<R: Read>(
    src: &StreamReader<R>,
    start: u64,
    header_size: u64,
) -> CaffResult<()> {
    let consumed = src.consumed_since(start);
    if consumed > header_size {
        return Err(CaffError::HeaderLengthMismatch {
            declared: header_size,
            consumed,
        });
    }
    Ok(())
}

fn read_pixels<R: Read>(src: &mut StreamReader<R>, content_size: u64) -> CaffResult<Vec<u8>> {
    let total = usize::try_from(content_size)
        .map_err(|_| CaffError::capacity(content_size, usize::MAX as u64))?;
    let mut pixels = vec![0u8; total];
    let mut scratch = vec![0u8; PIXEL_CHUNK.min(total)];

    let mut filled = 0usize;
    while filled < total {
        let want = (total - filled).min(scratch.len());
        src.read_exact(&mut scratch[..want])?;
        safe_copy(&mut pixels[filled..], Some(&scratch[..want]), want)?;
        filled += want;
    }
    Ok(pixels)
}
