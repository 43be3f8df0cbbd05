//! Image attachments for image-understanding prompts

use crate::error::ProviderError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use std::fs;
use std::path::{Path, PathBuf};

/// Largest image we send inline with a request
pub const MAX_INLINE_BYTES: usize = 20 * 1024 * 1024;

/// An image file read from disk, passed to the provider as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    path: PathBuf,
    mime_type: &'static str,
    bytes: Vec<u8>,
}

impl ImageInput {
    /// Read an image from disk.
    ///
    /// Only the file extension is checked; the bytes are not decoded.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ProviderError::InvalidImage(format!(
                "Image file '{}' not found.",
                path.display()
            )));
        }

        let mime_type = mime_type_for(path).ok_or_else(|| {
            ProviderError::InvalidImage(format!(
                "Unsupported image type '{}' (expected png, jpg, jpeg, gif, bmp or webp)",
                path.display()
            ))
        })?;

        let bytes = fs::read(path).map_err(|e| {
            ProviderError::InvalidImage(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        Self::from_bytes(path, mime_type, bytes)
    }

    fn from_bytes(
        path: &Path,
        mime_type: &'static str,
        bytes: Vec<u8>,
    ) -> Result<Self, ProviderError> {
        if bytes.is_empty() {
            return Err(ProviderError::InvalidImage(format!(
                "Image file '{}' is empty",
                path.display()
            )));
        }
        if bytes.len() > MAX_INLINE_BYTES {
            return Err(ProviderError::InvalidImage(format!(
                "Image file '{}' is {} bytes, the limit is {} bytes",
                path.display(),
                bytes.len(),
                MAX_INLINE_BYTES
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            mime_type,
            bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 payload for an inline-data part
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }
}

fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
