use std::path::PathBuf;

/// Convenience result type used across ciffcaff.
pub type CaffResult<T> = Result<T, CaffError>;

/// Top-level error taxonomy for decoding, validation and export.
///
/// Every variant aborts the operation that produced it; nothing is retried or resumed.
#[derive(thiserror::Error, Debug)]
pub enum CaffError {
    /// Underlying stream open/read/write failure, including unexpected end of input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A read or copy was attempted against a source that is absent or already released.
    #[error("invalid handle: {0}")]
    InvalidHandle(&'static str),

    /// A request does not fit the destination (or a configured decode limit).
    #[error("capacity exceeded: requested {requested} bytes, capacity {capacity}")]
    CapacityExceeded {
        /// Bytes the caller asked for.
        requested: u64,
        /// Bytes available.
        capacity: u64,
    },

    /// A running byte counter would wrap.
    #[error("counter overflow: {acc} + {delta} exceeds u64::MAX")]
    CounterOverflow {
        /// Counter value before the addition.
        acc: u64,
        /// Amount being added.
        delta: u64,
    },

    /// The four magic bytes do not identify the expected format.
    #[error("bad magic: expected {expected:?}, found {found:?}")]
    BadMagic {
        /// Magic the decoder expected.
        expected: [u8; 4],
        /// Magic actually read.
        found: [u8; 4],
    },

    /// `content_size != width * height * 3`.
    #[error("size mismatch: content size {content_size} != {width}x{height}x3")]
    SizeMismatch {
        /// Declared content size.
        content_size: u64,
        /// Declared width.
        width: u64,
        /// Declared height.
        height: u64,
    },

    /// The CIFF header bytes read do not add up to the declared header size.
    #[error("header length mismatch: declared {declared}, consumed {consumed}")]
    HeaderLengthMismatch {
        /// Declared header size.
        declared: u64,
        /// Bytes consumed so far.
        consumed: u64,
    },

    /// A CIFF tag contained a newline before its terminating NUL.
    #[error("tag contains a newline")]
    MultilineTag,

    /// A CAFF block id outside `1..=3`.
    #[error("unknown block id {0}")]
    UnknownBlockId(u8),

    /// A credits or animation block appeared before the header block.
    #[error("{block} block appeared before the header block")]
    HeaderNotFirst {
        /// Kind of the offending block.
        block: &'static str,
    },

    /// A CAFF block's declared length differs from the bytes its payload consumed.
    #[error("{block} block length mismatch: declared {declared}, consumed {consumed}")]
    BlockLengthMismatch {
        /// Kind of the offending block.
        block: &'static str,
        /// Declared length.
        declared: u64,
        /// Bytes consumed.
        consumed: u64,
    },

    /// A credits timestamp field is outside its calendar range.
    #[error("date field {field} out of range: {value}")]
    DateFieldOutOfRange {
        /// Name of the field (`month`, `day`, `hour`, `minute`).
        field: &'static str,
        /// Value read.
        value: u8,
    },

    /// The stream held fewer creator-name bytes than the declared name length.
    #[error("creator name length mismatch: declared {declared}, read {read}")]
    NameLengthMismatch {
        /// Declared name length.
        declared: u64,
        /// Bytes actually read.
        read: u64,
    },

    /// The image encoder rejected the frame.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// The export destination could not be created.
    #[error("cannot open output '{}': {source}", path.display())]
    OutputOpenFailed {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The container ended without an animation block.
    #[error("no animation block found")]
    NoAnimationFound,

    /// Invalid user-provided input (paths, modes, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaffError {
    /// Build a [`CaffError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaffError::EncodeFailed`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeFailed(msg.into())
    }

    pub(crate) fn capacity(requested: u64, capacity: u64) -> Self {
        Self::CapacityExceeded {
            requested,
            capacity,
        }
    }

    /// True when the error came from a truncated input stream.
    pub fn is_unexpected_eof(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
