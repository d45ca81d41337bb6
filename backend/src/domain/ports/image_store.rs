//! Port for listing image storage.
use async_trait::async_trait;

use crate::domain::{ImageUpload, StoredImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStoreError {
        /// The backing storage could not be reached.
        Unavailable { message: String } => ServiceUnavailable,
            "image storage unavailable: {message}",
        /// Reading or writing the file failed.
        Io { message: String } => InternalError, "image storage failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist a validated upload and return where it is served from.
    async fn store(&self, upload: &ImageUpload) -> Result<StoredImage, ImageStoreError>;

    /// Read a stored image by its generated file name.
    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, ImageStoreError>;
}
