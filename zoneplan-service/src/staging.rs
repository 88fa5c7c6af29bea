use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// An uploaded payload written to the staging directory.
/// The file is removed when the value is dropped.
pub struct StagedInput {
    path: PathBuf,
}

impl StagedInput {
    pub async fn create(dir: impl AsRef<Path>, payload: &[u8]) -> Result<Self> {
        let path = dir.as_ref().join(format!("input_{}.txt", xid::new()));
        tokio::fs::write(&path, payload)
            .await
            .with_context(|| format!("Failed staging input at {}", path.display()))?;
        log::debug!("Staged input at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed reading staged input {}", self.path.display()))
    }
}

impl Drop for StagedInput {
    fn drop(&mut self) {
        log::debug!("Removing staged input {}", self.path.display());
        if let Err(err) = std::fs::remove_file(&self.path) {
            log::error!("Failed removing staged input: {err}");
        }
    }
}
