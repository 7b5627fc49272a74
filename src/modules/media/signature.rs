//! File signature (magic number) validation.
//!
//! Uploads are accepted only when the leading bytes of the content match one of
//! the known signatures for the file's extension. The declared extension alone
//! is never trusted.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Binary formats the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Png,
    Matroska,
}

impl MediaFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Png => "image/png",
            MediaFormat::Matroska => "video/x-matroska",
        }
    }
}

/// Extension to signature mapping entry
struct Signature {
    extension: &'static str,
    format: MediaFormat,
    patterns: &'static [&'static [u8]],
}

const SIGNATURES: &[Signature] = &[
    Signature {
        extension: "png",
        format: MediaFormat::Png,
        patterns: &[&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]],
    },
    Signature {
        extension: "mkv",
        format: MediaFormat::Matroska,
        patterns: &[&[0x1A, 0x45, 0xDF, 0xA3]],
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Unsupported file extension: '{0}'")]
    UnsupportedExtension(String),

    #[error("File content does not match the .{0} signature")]
    SignatureMismatch(&'static str),
}

/// Lowercased extension of `file_name`, empty when there is none
fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

fn lookup(extension: &str) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| s.extension == extension)
}

/// Validate `content` against the signatures registered for the extension of
/// `file_name` and return the detected format.
pub fn validate(file_name: &str, content: &[u8]) -> Result<MediaFormat, SignatureError> {
    let extension = extension_of(file_name);
    let signature =
        lookup(&extension).ok_or_else(|| SignatureError::UnsupportedExtension(extension))?;

    let header_len = signature
        .patterns
        .iter()
        .map(|p| p.len())
        .max()
        .unwrap_or(0);
    let header = &content[..content.len().min(header_len)];

    // A short header can never be prefixed by a longer pattern, so truncated
    // content fails closed here.
    if signature.patterns.iter().any(|p| header.starts_with(p)) {
        Ok(signature.format)
    } else {
        debug!(
            "Signature mismatch for .{}: header={}",
            signature.extension,
            hex::encode(header)
        );
        Err(SignatureError::SignatureMismatch(signature.extension))
    }
}

/// Whether `content` is a valid media file for the extension of `file_name`
#[allow(dead_code)]
pub fn is_valid(file_name: &str, content: &[u8]) -> bool {
    validate(file_name, content).is_ok()
}
