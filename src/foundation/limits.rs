use serde::Serialize;

/// Upper bounds applied to untrusted length fields before any buffer is allocated for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DecodeLimits {
    /// Largest CIFF pixel plane (`content_size`) the decoder will allocate.
    pub max_pixel_bytes: u64,
    /// Largest CAFF creator name the decoder will allocate.
    pub max_creator_len: u64,
}

impl DecodeLimits {
    /// 256 MiB, enough for a 9459x9459 RGB frame.
    pub const DEFAULT_MAX_PIXEL_BYTES: u64 = 256 * 1024 * 1024;
    /// 64 KiB.
    pub const DEFAULT_MAX_CREATOR_LEN: u64 = 64 * 1024;
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_pixel_bytes: Self::DEFAULT_MAX_PIXEL_BYTES,
            max_creator_len: Self::DEFAULT_MAX_CREATOR_LEN,
        }
    }
}
