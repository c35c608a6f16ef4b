//! Building blocks shared by every decoder: errors, limits and bounds-checked I/O.

/// Error taxonomy and result alias.
pub mod error;
/// Bounds-checked read/copy primitives and the counting stream reader.
pub mod io;
/// Allocation limits for untrusted length fields.
pub mod limits;
