//! CAFF animation container decoding.
//!
//! A CAFF file is a sequence of `id u8 | declared_length u64 | payload` blocks. The header block
//! must come first; credits and animation blocks may follow. Only the first animation block is
//! decoded, after which the reader stops and releases its source.

use std::io::Read;

use serde::Serialize;

use crate::{
    codec::ciff::{CIFF_FIXED_HEADER_LEN, CiffImage, decode_ciff},
    export::sink::{ImageSink, RgbFrame},
    foundation::{
        error::{CaffError, CaffResult},
        io::StreamReader,
        limits::DecodeLimits,
    },
};

/// Magic bytes opening the CAFF header block payload.
pub const CAFF_MAGIC: &[u8; 4] = b"CAFF";

/// Magic + header size + animation count.
pub const CAFF_HEADER_LEN: u64 = 4 + 8 + 8;

/// Timestamp (6 bytes) + creator length (8 bytes).
pub const CAFF_CREDITS_FIXED_LEN: u64 = 6 + 8;

/// Block kinds, by their on-disk id byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum BlockId {
    /// File header; must be first.
    Header = 1,
    /// Creation date and creator.
    Credits = 2,
    /// Frame duration plus an embedded CIFF image.
    Animation = 3,
}

impl BlockId {
    /// Lowercase name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Credits => "credits",
            Self::Animation => "animation",
        }
    }

    /// Smallest payload a well-formed block of this kind can have.
    pub fn min_payload_len(self) -> u64 {
        match self {
            Self::Header => CAFF_HEADER_LEN,
            Self::Credits => CAFF_CREDITS_FIXED_LEN,
            // Duration, then a CIFF header with at least its caption newline.
            Self::Animation => 8 + CIFF_FIXED_HEADER_LEN + 1,
        }
    }
}

impl TryFrom<u8> for BlockId {
    type Error = CaffError;

    fn try_from(v: u8) -> CaffResult<Self> {
        match v {
            1 => Ok(Self::Header),
            2 => Ok(Self::Credits),
            3 => Ok(Self::Animation),
            other => Err(CaffError::UnknownBlockId(other)),
        }
    }
}

/// Header block payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CaffHeader {
    /// Header size declared inside the payload; equals the block length.
    pub header_size: u64,
    /// Number of animation blocks the file claims to hold.
    pub animation_count: u64,
}

/// Credits timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CreditsDate {
    /// Calendar year.
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..=23
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
}

impl CreditsDate {
    /// Check every field against its calendar range.
    pub fn validate(&self) -> CaffResult<()> {
        let fields = [
            ("month", self.month, 1u8..=12),
            ("day", self.day, 1u8..=31),
            ("hour", self.hour, 0u8..=23),
            ("minute", self.minute, 0u8..=59),
        ];
        for (field, value, range) in fields {
            if !range.contains(&value) {
                return Err(CaffError::DateFieldOutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// Credits block payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaffCredits {
    /// Creation timestamp.
    pub date: CreditsDate,
    /// Creator name.
    pub creator: String,
}

/// Animation block payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaffAnimation {
    /// How long the frame is shown, in milliseconds.
    pub duration_ms: u64,
    /// The embedded frame.
    pub image: CiffImage,
}

/// One decoded block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaffBlock {
    /// See [`CaffHeader`].
    Header(CaffHeader),
    /// See [`CaffCredits`].
    Credits(CaffCredits),
    /// See [`CaffAnimation`].
    Animation(CaffAnimation),
}

/// Where the block reader is in its pass over the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReaderState {
    /// Nothing read yet; only a header block is acceptable.
    ExpectFirstBlock,
    /// Header seen; any block kind is acceptable.
    Reading,
    /// First animation decoded; the source has been released.
    Done,
    /// A block failed to decode; the source has been released.
    Failed,
}

/// Block-at-a-time CAFF reader.
#[derive(Debug)]
pub struct CaffReader<R> {
    src: StreamReader<R>,
    limits: DecodeLimits,
    state: ReaderState,
    animation_count: Option<u64>,
}

impl<R: Read> CaffReader<R> {
    /// Start reading a container from its first byte.
    pub fn new(inner: R, limits: DecodeLimits) -> Self {
        Self {
            src: StreamReader::new(inner),
            limits,
            state: ReaderState::ExpectFirstBlock,
            animation_count: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Animation count from the most recent header block, if one has been read.
    pub fn animation_count(&self) -> Option<u64> {
        self.animation_count
    }

    /// Total container bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.src.consumed()
    }

    /// Decode the next block.
    ///
    /// Returns `Ok(None)` once the first animation block has been returned. Running out of input
    /// before that is [`CaffError::NoAnimationFound`]. Any error leaves the reader `Failed`.
    pub fn next_block(&mut self) -> CaffResult<Option<CaffBlock>> {
        match self.state {
            ReaderState::Done => return Ok(None),
            ReaderState::Failed => {
                return Err(CaffError::InvalidHandle("caff reader already failed"));
            }
            ReaderState::ExpectFirstBlock | ReaderState::Reading => {}
        }

        match self.read_block() {
            Ok(block) => {
                if let CaffBlock::Animation(_) = block {
                    self.finish(ReaderState::Done);
                }
                Ok(Some(block))
            }
            Err(e) => {
                self.finish(ReaderState::Failed);
                Err(e)
            }
        }
    }

    fn finish(&mut self, state: ReaderState) {
        self.state = state;
        self.src.release();
    }

    fn read_block(&mut self) -> CaffResult<CaffBlock> {
        let Some(raw_id) = self.src.try_read_u8()? else {
            return Err(CaffError::NoAnimationFound);
        };
        let id = BlockId::try_from(raw_id)?;
        let declared = self.src.read_u64_le()?;
        tracing::debug!(block = id.name(), declared, offset = self.src.consumed(), "caff block");

        if id != BlockId::Header && self.animation_count.is_none() {
            return Err(CaffError::HeaderNotFirst { block: id.name() });
        }
        if declared < id.min_payload_len() {
            return Err(CaffError::BlockLengthMismatch {
                block: id.name(),
                declared,
                consumed: 0,
            });
        }

        let mark = self.src.consumed();
        let block = match id {
            BlockId::Header => CaffBlock::Header(self.read_header()?),
            BlockId::Credits => CaffBlock::Credits(self.read_credits()?),
            BlockId::Animation => CaffBlock::Animation(self.read_animation()?),
        };

        let consumed = self.src.consumed_since(mark);
        if consumed != declared {
            return Err(CaffError::BlockLengthMismatch {
                block: id.name(),
                declared,
                consumed,
            });
        }
        Ok(block)
    }

    fn read_header(&mut self) -> CaffResult<CaffHeader> {
        let mark = self.src.consumed();
        let mut magic = [0u8; 4];
        self.src.read_exact(&mut magic)?;
        if &magic != CAFF_MAGIC {
            return Err(CaffError::BadMagic {
                expected: *CAFF_MAGIC,
                found: magic,
            });
        }
        let header_size = self.src.read_u64_le()?;
        let animation_count = self.src.read_u64_le()?;

        // The payload repeats its own length; it has to agree with what was actually read.
        let consumed = self.src.consumed_since(mark);
        if header_size != consumed {
            return Err(CaffError::BlockLengthMismatch {
                block: BlockId::Header.name(),
                declared: header_size,
                consumed,
            });
        }

        if let Some(prev) = self.animation_count {
            tracing::warn!(prev, animation_count, "repeated caff header block");
        }
        self.animation_count = Some(animation_count);
        self.state = ReaderState::Reading;
        Ok(CaffHeader {
            header_size,
            animation_count,
        })
    }

    fn read_credits(&mut self) -> CaffResult<CaffCredits> {
        let date = CreditsDate {
            year: self.src.read_u16_le()?,
            month: self.src.read_u8()?,
            day: self.src.read_u8()?,
            hour: self.src.read_u8()?,
            minute: self.src.read_u8()?,
        };
        date.validate()?;

        let creator_len = self.src.read_u64_le()?;
        if creator_len > self.limits.max_creator_len {
            return Err(CaffError::capacity(
                creator_len,
                self.limits.max_creator_len,
            ));
        }
        // Bounded by `max_creator_len` above.
        let mut name = vec![0u8; creator_len as usize];
        let read = self.src.read_up_to(&mut name)? as u64;
        if read != creator_len {
            return Err(CaffError::NameLengthMismatch {
                declared: creator_len,
                read,
            });
        }

        Ok(CaffCredits {
            date,
            creator: String::from_utf8_lossy(&name).into_owned(),
        })
    }

    fn read_animation(&mut self) -> CaffResult<CaffAnimation> {
        let duration_ms = self.src.read_u64_le()?;
        let decoded = decode_ciff(&mut self.src, &self.limits)?;
        Ok(CaffAnimation {
            duration_ms,
            image: decoded.image,
        })
    }
}

/// What a successful [`decode_caff`] pass saw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CaffSummary {
    /// Animation count from the last header block.
    pub animation_count: u64,
    /// Credits blocks validated and dropped.
    pub credits_seen: usize,
    /// Duration of the exported frame.
    pub duration_ms: u64,
    /// Exported frame width.
    pub width: u64,
    /// Exported frame height.
    pub height: u64,
}

/// Decode a container and hand its first animation frame to `sink`.
#[tracing::instrument(skip_all)]
pub fn decode_caff<R: Read, S: ImageSink + ?Sized>(
    inner: R,
    limits: DecodeLimits,
    sink: &mut S,
) -> CaffResult<CaffSummary> {
    let mut reader = CaffReader::new(inner, limits);
    let mut credits_seen = 0usize;

    while let Some(block) = reader.next_block()? {
        match block {
            CaffBlock::Header(h) => {
                tracing::debug!(animation_count = h.animation_count, "caff header");
            }
            CaffBlock::Credits(c) => {
                credits_seen += 1;
                tracing::debug!(creator = %c.creator, year = c.date.year, "caff credits");
            }
            CaffBlock::Animation(anim) => {
                let img = &anim.image;
                sink.write_frame(&RgbFrame {
                    width: img.width,
                    height: img.height,
                    pixels: &img.pixels,
                })?;
                return Ok(CaffSummary {
                    animation_count: reader.animation_count().unwrap_or_default(),
                    credits_seen,
                    duration_ms: anim.duration_ms,
                    width: img.width,
                    height: img.height,
                });
            }
        }
    }

    Err(CaffError::NoAnimationFound)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/caff.rs"]
mod tests;
