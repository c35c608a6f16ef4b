//! Bounds-checked read/copy primitives and the byte-counting stream every decoder reads through.

use std::io::{ErrorKind, Read};

use crate::foundation::error::{CaffError, CaffResult};

/// Read up to `elem_size * elem_count` bytes from `src` into the front of `dest`.
///
/// Fails with [`CaffError::InvalidHandle`] when `src` is absent and with
/// [`CaffError::CapacityExceeded`] when the request does not fit `dest`. Otherwise keeps reading
/// until the request is satisfied or the stream ends, and returns the byte count actually read.
/// A short count means end-of-stream; the caller decides whether that is an error.
pub fn safe_read<R: Read + ?Sized>(
    dest: &mut [u8],
    elem_size: usize,
    elem_count: usize,
    src: Option<&mut R>,
) -> CaffResult<usize> {
    let src = src.ok_or(CaffError::InvalidHandle("read from an absent source"))?;
    let requested = elem_size
        .checked_mul(elem_count)
        .ok_or(CaffError::capacity(u64::MAX, dest.len() as u64))?;
    if requested > dest.len() {
        return Err(CaffError::capacity(requested as u64, dest.len() as u64));
    }

    let mut filled = 0usize;
    while filled < requested {
        match src.read(&mut dest[filled..requested]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Copy `byte_count` bytes from the front of `src` into the front of `dest`.
pub fn safe_copy(dest: &mut [u8], src: Option<&[u8]>, byte_count: usize) -> CaffResult<()> {
    let src = src.ok_or(CaffError::InvalidHandle("copy from an absent source"))?;
    if byte_count > dest.len() {
        return Err(CaffError::capacity(byte_count as u64, dest.len() as u64));
    }
    if byte_count > src.len() {
        return Err(CaffError::capacity(byte_count as u64, src.len() as u64));
    }
    dest[..byte_count].copy_from_slice(&src[..byte_count]);
    Ok(())
}

/// `acc + delta`, failing with [`CaffError::CounterOverflow`] instead of wrapping.
pub fn checked_add(acc: u64, delta: u64) -> CaffResult<u64> {
    if delta > u64::MAX - acc {
        return Err(CaffError::CounterOverflow { acc, delta });
    }
    Ok(acc + delta)
}

/// Owning byte source with an overflow-checked count of every byte consumed.
///
/// Nested decoders take a mark with [`StreamReader::consumed`] and measure their own payload with
/// [`StreamReader::consumed_since`]. Once [`StreamReader::release`] drops the source, every
/// further read fails with [`CaffError::InvalidHandle`].
#[derive(Debug)]
pub struct StreamReader<R> {
    inner: Option<R>,
    consumed: u64,
}

impl<R: Read> StreamReader<R> {
    /// Wrap a readable source. The byte count starts at zero.
    pub fn new(inner: R) -> Self {
        Self {
            inner: Some(inner),
            consumed: 0,
        }
    }

    /// Total bytes consumed since construction.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Bytes consumed since an earlier [`StreamReader::consumed`] mark.
    pub fn consumed_since(&self, mark: u64) -> u64 {
        self.consumed.saturating_sub(mark)
    }

    /// Whether the source is still held.
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Drop the underlying source, closing it.
    pub fn release(&mut self) {
        self.inner = None;
    }

    /// Give back the source, if it has not been released.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }

    /// Read up to `dest.len()` bytes; a short count means end-of-stream.
    pub fn read_up_to(&mut self, dest: &mut [u8]) -> CaffResult<usize> {
        let len = dest.len();
        let n = safe_read(dest, 1, len, self.inner.as_mut())?;
        self.consumed = checked_add(self.consumed, n as u64)?;
        Ok(n)
    }

    /// Fill `dest` completely or fail with an `UnexpectedEof` I/O error.
    pub fn read_exact(&mut self, dest: &mut [u8]) -> CaffResult<()> {
        let n = self.read_up_to(dest)?;
        if n < dest.len() {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("stream ended after {n} of {} bytes", dest.len()),
            )
            .into());
        }
        Ok(())
    }

    /// Read one byte, or `None` on a clean end of input.
    pub fn try_read_u8(&mut self) -> CaffResult<Option<u8>> {
        let mut b = [0u8; 1];
        match self.read_up_to(&mut b)? {
            0 => Ok(None),
            _ => Ok(Some(b[0])),
        }
    }

    /// Read one byte, failing on end of input.
    pub fn read_u8(&mut self) -> CaffResult<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> CaffResult<u16> {
        let mut b = [0u8; 2];
        self.read_exact(&mut b)?;
        Ok(u16::from_le_bytes(b))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> CaffResult<u64> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(u64::from_le_bytes(b))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/io.rs"]
mod tests;
