use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder};

use crate::{
    export::sink::{ImageSink, RgbFrame},
    foundation::error::{CaffError, CaffResult},
};

/// Largest width or height a baseline JPEG can describe.
pub const JPEG_MAX_DIMENSION: u64 = 65_535;

/// JPEG output options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegOpts {
    /// Encoder quality, 1..=100.
    pub quality: u8,
    /// Replace an existing file at the destination.
    pub overwrite: bool,
}

impl Default for JpegOpts {
    fn default() -> Self {
        Self {
            quality: 90,
            overwrite: true,
        }
    }
}

impl JpegOpts {
    /// Reject option values the encoder cannot honor.
    pub fn validate(&self) -> CaffResult<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(CaffError::validation(format!(
                "jpeg quality must be in 1..=100, got {}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Encode `frame` as a baseline JPEG into `out`.
///
/// The encoder writes only to the sink it is given, so callers choose where bytes end up.
pub fn encode_jpeg<W: Write>(out: &mut W, frame: &RgbFrame<'_>, quality: u8) -> CaffResult<()> {
    let (width, height) = jpeg_dimensions(frame)?;
    let encoder = JpegEncoder::new_with_quality(out, quality);
    encoder
        .write_image(frame.pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| CaffError::encode(format!("jpeg encoder: {e}")))
}

fn jpeg_dimensions(frame: &RgbFrame<'_>) -> CaffResult<(u32, u32)> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaffError::encode(format!(
            "cannot encode an empty {}x{} frame",
            frame.width, frame.height
        )));
    }
    if frame.width > JPEG_MAX_DIMENSION || frame.height > JPEG_MAX_DIMENSION {
        return Err(CaffError::encode(format!(
            "{}x{} exceeds the jpeg limit of {JPEG_MAX_DIMENSION}",
            frame.width, frame.height
        )));
    }
    // Both dimensions are <= 65535 here, so neither the casts nor the product can overflow.
    let expected = frame.width * frame.height * 3;
    if frame.pixels.len() as u64 != expected {
        return Err(CaffError::encode(format!(
            "pixel plane holds {} bytes, expected {expected}",
            frame.pixels.len()
        )));
    }
    Ok((frame.width as u32, frame.height as u32))
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> CaffResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Sink that writes each frame to a JPEG file.
///
/// The frame is fully encoded in memory before the destination is opened, and a write that
/// fails partway removes the file, so a failed export never leaves a truncated JPEG behind.
#[derive(Debug)]
pub struct JpegFileSink {
    out_path: PathBuf,
    opts: JpegOpts,
    bytes_written: Option<u64>,
}

impl JpegFileSink {
    /// Create a sink targeting `out_path`.
    pub fn new(out_path: impl Into<PathBuf>, opts: JpegOpts) -> CaffResult<Self> {
        opts.validate()?;
        Ok(Self {
            out_path: out_path.into(),
            opts,
            bytes_written: None,
        })
    }

    /// Destination path.
    pub fn out_path(&self) -> &Path {
        &self.out_path
    }

    /// Size of the last file written, if any.
    pub fn bytes_written(&self) -> Option<u64> {
        self.bytes_written
    }
}

impl ImageSink for JpegFileSink {
    fn write_frame(&mut self, frame: &RgbFrame<'_>) -> CaffResult<()> {
        let mut encoded = Vec::new();
        encode_jpeg(&mut encoded, frame, self.opts.quality)?;

        ensure_parent_dir(&self.out_path)?;
        let mut open = OpenOptions::new();
        open.write(true);
        if self.opts.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let mut file = open
            .open(&self.out_path)
            .map_err(|source| CaffError::OutputOpenFailed {
                path: self.out_path.clone(),
                source,
            })?;

        if let Err(e) = file.write_all(&encoded).and_then(|()| file.sync_all()) {
            drop(file);
            discard_partial(&self.out_path);
            return Err(e.into());
        }

        tracing::info!(path = %self.out_path.display(), bytes = encoded.len(), "wrote jpeg");
        self.bytes_written = Some(encoded.len() as u64);
        Ok(())
    }
}

/// Remove a partially written output. Returns whether the file is gone.
fn discard_partial(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial jpeg");
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/jpeg.rs"]
mod tests;
