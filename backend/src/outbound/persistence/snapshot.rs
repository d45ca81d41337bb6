//! JSON snapshot files for the in-process store.
//!
//! Each table lives in its own file inside the data directory. Files are
//! replaced by writing a sibling temporary file and renaming it over the
//! old one, so a crash mid-write leaves the previous snapshot intact.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::models::RowError;

pub(crate) const USERS_FILE: &str = "users.json";
pub(crate) const LISTINGS_FILE: &str = "listings.json";
pub(crate) const INVESTMENTS_FILE: &str = "investments.json";
pub(crate) const TEAM_INVITES_FILE: &str = "team_invites.json";
pub(crate) const PENDING_OTPS_FILE: &str = "pending_otps.json";
pub(crate) const ADJUSTMENTS_FILE: &str = "listing_adjustments.json";

/// Errors raised while reading or writing snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot {path} is not valid JSON: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("snapshot {path} holds an invalid row: {source}")]
    InvalidRow {
        path: PathBuf,
        #[source]
        source: RowError,
    },
}

impl SnapshotError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// One table serialized and waiting to be written.
#[derive(Debug)]
pub(crate) struct EncodedTable {
    pub(crate) file: &'static str,
    payload: Vec<u8>,
}

/// Capability handle on the data directory.
#[derive(Debug)]
pub(crate) struct SnapshotDir {
    root: PathBuf,
    dir: Dir,
}

impl SnapshotDir {
    /// Open `root`, creating it when missing.
    pub(crate) fn open(root: &Path) -> Result<Self, SnapshotError> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|error| SnapshotError::io(root, error))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| SnapshotError::io(root, error))?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Read every row of `file`, converting each into `T`. A missing file
    /// is an empty table.
    pub(crate) fn load<R, T>(&self, file: &str) -> Result<Vec<T>, SnapshotError>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = RowError>,
    {
        let path = self.root.join(file);
        let payload = match self.dir.read(file) {
            Ok(payload) => payload,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(SnapshotError::io(path, error)),
        };
        let rows: Vec<R> = serde_json::from_slice(&payload).map_err(|error| SnapshotError::Parse {
            path: path.clone(),
            message: error.to_string(),
        })?;
        rows.into_iter()
            .map(|row| {
                T::try_from(row).map_err(|source| SnapshotError::InvalidRow {
                    path: path.clone(),
                    source,
                })
            })
            .collect()
    }

    /// Serialize `rows` for a later [`SnapshotDir::write`].
    pub(crate) fn encode<R: Serialize>(
        &self,
        file: &'static str,
        rows: &[R],
    ) -> Result<EncodedTable, SnapshotError> {
        let payload = serde_json::to_vec_pretty(rows).map_err(|error| SnapshotError::Parse {
            path: self.root.join(file),
            message: error.to_string(),
        })?;
        Ok(EncodedTable { file, payload })
    }

    /// Replace the table's file with its encoded rows.
    pub(crate) fn write(&self, table: &EncodedTable) -> Result<(), SnapshotError> {
        let file = table.file;
        let path = self.root.join(file);
        let staging = format!(".{file}.tmp-{}", Uuid::new_v4().simple());
        self.dir
            .write(&staging, &table.payload)
            .map_err(|error| SnapshotError::io(self.root.join(&staging), error))?;
        self.dir.rename(&staging, &self.dir, file).map_err(|error| {
            let _cleanup = self.dir.remove_file(&staging);
            SnapshotError::io(path, error)
        })
    }
}
