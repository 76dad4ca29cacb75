//! Request-scoped staging storage
//!
//! Every download request gets its own temporary directory. Workers write one
//! file each into it; the directory and everything in it is removed when the
//! [`StagingArea`] is closed or dropped, whichever happens first.

use std::io;
use std::path::Path;
use tempfile::TempDir;

const STAGING_PREFIX: &str = "ringtones-";

/// A temporary directory owned by one request
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Creates a fresh staging directory under the system temp dir
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(STAGING_PREFIX).tempdir()?;
        tracing::debug!("Created staging area {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Returns the staging directory path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the staging directory, reporting any removal error
    ///
    /// Dropping the area also removes it, but silently.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        tracing::debug!("Removed staging area {}", path.display());
        Ok(())
    }
}
