//! Local filesystem adapter for listing images.
//!
//! Files live flat inside one upload directory opened through `cap_std`, so
//! a stored name can never escape it. Names are generated on store and
//! checked with [`is_safe_stored_name`] on fetch.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{ImageStore, ImageStoreError};
use crate::domain::{ImageUpload, StoredImage, is_safe_stored_name};

/// Image store writing into a local directory.
pub struct LocalImageStore {
    dir: Arc<Dir>,
    clock: Arc<dyn Clock>,
}

impl LocalImageStore {
    /// Open `root`, creating it when missing.
    pub fn open(root: &Path, clock: Arc<dyn Clock>) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            clock,
        })
    }
}

fn join_error(err: tokio::task::JoinError) -> ImageStoreError {
    ImageStoreError::io(format!("storage task failed: {err}"))
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, upload: &ImageUpload) -> Result<StoredImage, ImageStoreError> {
        let name = upload.stored_name(self.clock.utc());
        let dir = Arc::clone(&self.dir);
        let bytes = upload.bytes().to_vec();
        let target = name.clone();
        tokio::task::spawn_blocking(move || dir.write(&target, bytes))
            .await
            .map_err(join_error)?
            .map_err(|err| ImageStoreError::io(format!("{name}: {err}")))?;
        debug!(
            name = %name,
            file_name = upload.file_name(),
            content_type = upload.content_type(),
            "image stored"
        );
        Ok(StoredImage::from_name(name))
    }

    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        if !is_safe_stored_name(name) {
            return Ok(None);
        }
        let dir = Arc::clone(&self.dir);
        let target = name.to_owned();
        let outcome = tokio::task::spawn_blocking(move || dir.read(&target))
            .await
            .map_err(join_error)?;
        match outcome {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ImageStoreError::io(format!("{name}: {err}"))),
        }
    }
}
