use crate::foundation::error::CaffResult;

/// Borrowed RGB pixel plane: interleaved, row-major, 3 bytes per pixel.
#[derive(Clone, Copy, Debug)]
pub struct RgbFrame<'a> {
    /// Width in pixels.
    pub width: u64,
    /// Height in pixels.
    pub height: u64,
    /// `width * height * 3` bytes.
    pub pixels: &'a [u8],
}

/// Owned copy of a frame, as captured by [`InMemorySink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFrame {
    /// Width in pixels.
    pub width: u64,
    /// Height in pixels.
    pub height: u64,
    /// Pixel bytes.
    pub pixels: Vec<u8>,
}

/// Destination for decoded frames.
pub trait ImageSink {
    /// Consume one decoded frame.
    fn write_frame(&mut self, frame: &RgbFrame<'_>) -> CaffResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    frames: Vec<ExportedFrame>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames in the order they were written.
    pub fn frames(&self) -> &[ExportedFrame] {
        &self.frames
    }
}

impl ImageSink for InMemorySink {
    fn write_frame(&mut self, frame: &RgbFrame<'_>) -> CaffResult<()> {
        self.frames.push(ExportedFrame {
            width: frame.width,
            height: frame.height,
            pixels: frame.pixels.to_vec(),
        });
        Ok(())
    }
}
