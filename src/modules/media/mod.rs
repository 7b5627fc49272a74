//! Media inspection and transformation
//!
//! Pure functions over raw bytes: signature validation for uploads and
//! display-time downscaling for large images.

pub mod downscale;
pub mod signature;

pub use downscale::{DisplayBounds, DownscaleError};
pub use signature::{MediaFormat, SignatureError};
