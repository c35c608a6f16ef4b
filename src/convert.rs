//! Entry dispatch: pick a decoder by input kind, open the file, decode, export.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    codec::{
        caff::{CaffBlock, CaffCredits, CaffHeader, CaffReader, decode_caff},
        ciff::{CiffImage, decode_ciff},
    },
    export::{
        jpeg::{JpegFileSink, JpegOpts},
        sink::{ImageSink, RgbFrame},
    },
    foundation::{
        error::{CaffError, CaffResult},
        io::StreamReader,
        limits::DecodeLimits,
    },
};

/// Longest input path accepted, in bytes.
pub const MAX_PATH_LEN: usize = 4096;

/// Extension given to exported images.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Which format an input file holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// A bare CIFF still image.
    Ciff,
    /// A CAFF animation container.
    Caff,
}

impl InputKind {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Ciff => "ciff",
            Self::Caff => "caff",
        }
    }

    /// Infer the kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ciff" => Some(Self::Ciff),
            "caff" => Some(Self::Caff),
            _ => None,
        }
    }
}

/// Options for [`convert_file`].
#[derive(Clone, Debug, Default)]
pub struct ConvertOpts {
    /// Allocation limits for the decoder.
    pub limits: DecodeLimits,
    /// JPEG output options.
    pub jpeg: JpegOpts,
    /// Explicit output path; derived from the input when `None`.
    pub out: Option<PathBuf>,
}

/// Result of a successful conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    /// Input kind.
    pub kind: InputKind,
    /// Path of the written JPEG.
    pub out_path: PathBuf,
    /// Exported width.
    pub width: u64,
    /// Exported height.
    pub height: u64,
    /// Size of the written JPEG.
    pub bytes_written: u64,
}

/// Check that `path` is short enough and carries the extension `kind` requires.
pub fn validate_input_path(path: &Path, kind: InputKind) -> CaffResult<()> {
    let len = path.as_os_str().len();
    if len > MAX_PATH_LEN {
        return Err(CaffError::validation(format!(
            "input path is {len} bytes, limit is {MAX_PATH_LEN}"
        )));
    }
    if InputKind::from_path(path) != Some(kind) {
        return Err(CaffError::validation(format!(
            "{} parsing requires a .{} file, got '{}'",
            kind.extension(),
            kind.extension(),
            path.display()
        )));
    }
    Ok(())
}

/// `frames/a.caff` -> `frames/a.jpg`.
pub fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension(OUTPUT_EXTENSION)
}

/// Decode `path` as `kind` and export its (first) frame as a JPEG.
#[tracing::instrument(skip_all, fields(path = %path.display(), ?kind))]
pub fn convert_file(path: &Path, kind: InputKind, opts: &ConvertOpts) -> CaffResult<ConvertReport> {
    validate_input_path(path, kind)?;
    let out_path = opts
        .out
        .clone()
        .unwrap_or_else(|| derive_output_path(path));
    let mut sink = JpegFileSink::new(&out_path, opts.jpeg)?;

    let input = open_input(path)?;
    let (width, height) = match kind {
        InputKind::Ciff => {
            let mut src = StreamReader::new(input);
            let decoded = decode_ciff(&mut src, &opts.limits)?;
            src.release();
            let img = &decoded.image;
            sink.write_frame(&RgbFrame {
                width: img.width,
                height: img.height,
                pixels: &img.pixels,
            })?;
            (img.width, img.height)
        }
        InputKind::Caff => {
            let summary = decode_caff(input, opts.limits, &mut sink)?;
            (summary.width, summary.height)
        }
    };

    Ok(ConvertReport {
        kind,
        bytes_written: sink.bytes_written().unwrap_or_default(),
        out_path,
        width,
        height,
    })
}

/// Metadata of a decoded input, without pixel data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    /// Input kind.
    pub kind: InputKind,
    /// Container header, for CAFF inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<CaffHeader>,
    /// Credits blocks, for CAFF inputs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub credits: Vec<CaffCredits>,
    /// Frame duration, for CAFF inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// The (first) image.
    pub image: CiffImage,
    /// Limits the input was decoded under.
    pub limits: DecodeLimits,
}

/// Decode `path` as `kind` and report its metadata without exporting anything.
#[tracing::instrument(skip_all, fields(path = %path.display(), ?kind))]
pub fn inspect_file(
    path: &Path,
    kind: InputKind,
    limits: &DecodeLimits,
) -> CaffResult<InspectReport> {
    validate_input_path(path, kind)?;
    let input = open_input(path)?;

    match kind {
        InputKind::Ciff => {
            let decoded = decode_ciff(&mut StreamReader::new(input), limits)?;
            Ok(InspectReport {
                kind,
                header: None,
                credits: Vec::new(),
                duration_ms: None,
                image: decoded.image,
                limits: *limits,
            })
        }
        InputKind::Caff => {
            let mut reader = CaffReader::new(input, *limits);
            let mut header = None;
            let mut credits = Vec::new();
            while let Some(block) = reader.next_block()? {
                match block {
                    CaffBlock::Header(h) => header = Some(h),
                    CaffBlock::Credits(c) => credits.push(c),
                    CaffBlock::Animation(anim) => {
                        return Ok(InspectReport {
                            kind,
                            header,
                            credits,
                            duration_ms: Some(anim.duration_ms),
                            image: anim.image,
                            limits: *limits,
                        });
                    }
                }
            }
            Err(CaffError::NoAnimationFound)
        }
    }
}

fn open_input(path: &Path) -> CaffResult<BufReader<File>> {
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("failed to open input '{}': {e}", path.display()),
        )
    })?;
    Ok(BufReader::new(file))
}

#[cfg(test)]
#[path = "../tests/unit/convert.rs"]
mod tests;
