use std::fs;
use std::path::PathBuf;

use super::errors::ExportError;
use super::pipeline::TransientExport;

/// Host-side save interaction (a download prompt, a copy into a folder, ...).
pub trait SaveTarget: Send + Sync {
    /// Persist the transient export; returns where it ended up.
    fn save(&self, export: &TransientExport<'_>) -> Result<PathBuf, ExportError>;
}

/// Saves exports into a fixed directory under their requested name.
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    directory: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl SaveTarget for DirectorySaveTarget {
    fn save(&self, export: &TransientExport<'_>) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.directory)?;
        let destination = self.directory.join(export.file_name());
        fs::copy(export.path(), &destination).map_err(|e| ExportError::SaveFailed {
            message: format!("'{}': {}", destination.display(), e),
        })?;
        Ok(destination)
    }
}
