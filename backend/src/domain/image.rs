//! Validated listing image uploads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Public path prefix stored images are served under.
pub const UPLOADS_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUploadError {
    #[error("only image uploads are allowed, got '{content_type}'")]
    NotAnImage { content_type: String },
    #[error("image type '{content_type}' is not supported; use PNG, JPEG, GIF, WebP or AVIF")]
    UnsupportedType { content_type: String },
    #[error("image is empty")]
    Empty,
    #[error("image exceeds the {max} byte limit")]
    TooLarge { max: usize },
}

/// Raster formats accepted for storage, with the extension each is stored
/// under. Scriptable formats such as SVG are refused.
const RASTER_TYPES: [(&str, &str); 5] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
];

/// An image accepted for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    extension: &'static str,
    content_type: String,
    bytes: Vec<u8>,
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    RASTER_TYPES
        .iter()
        .find(|(known, _)| *known == content_type)
        .map(|(_, ext)| *ext)
}

impl ImageUpload {
    /// Validate the content type and size of an upload.
    ///
    /// The stored extension follows the content type; the client's file
    /// name is kept for logging only.
    ///
    /// # Examples
    /// ```
    /// use propvest::domain::ImageUpload;
    ///
    /// assert!(ImageUpload::new("tower.png", "image/png", vec![1, 2, 3]).is_ok());
    /// assert!(ImageUpload::new("notes.txt", "text/plain", vec![1]).is_err());
    /// assert!(ImageUpload::new("logo.svg", "image/svg+xml", vec![1]).is_err());
    /// ```
    pub fn new(
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, ImageUploadError> {
        let content_type = content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            return Err(ImageUploadError::NotAnImage { content_type });
        }
        let Some(extension) = extension_for(&content_type) else {
            return Err(ImageUploadError::UnsupportedType { content_type });
        };
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageUploadError::TooLarge {
                max: MAX_IMAGE_BYTES,
            });
        }
        Ok(Self {
            file_name: file_name.trim().to_owned(),
            extension,
            content_type,
            bytes,
        })
    }

    /// Unique storage name: `{millis}-{uuid}.{ext}`.
    pub fn stored_name(&self, at: DateTime<Utc>) -> String {
        format!(
            "{}-{}.{}",
            at.timestamp_millis(),
            Uuid::new_v4(),
            self.extension
        )
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// File name the client supplied.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Where a stored image can be retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub name: String,
    pub uri: String,
}

impl StoredImage {
    pub fn from_name(name: String) -> Self {
        let uri = format!("{UPLOADS_PREFIX}{name}");
        Self { name, uri }
    }
}

/// Return `true` for names produced by [`ImageUpload::stored_name`]-style
/// generation: no separators, no parent references.
pub fn is_safe_stored_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '.')
}

/// Content type for a stored image, taken from its extension. Anything
/// outside the accepted raster formats is served as opaque bytes.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    let ext = if ext == "jpeg" { "jpg".to_owned() } else { ext };
    RASTER_TYPES
        .iter()
        .find(|(_, known)| *known == ext)
        .map_or("application/octet-stream", |(content_type, _)| *content_type)
}
