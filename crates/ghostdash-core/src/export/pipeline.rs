use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::errors::ExportError;
use super::target::SaveTarget;

/// A payload parked on disk while the host saves it.
#[derive(Debug)]
pub struct TransientExport<'a> {
    path: &'a Path,
    file_name: &'a str,
    len: usize,
}

impl TransientExport<'_> {
    /// Location of the temporary copy. Only valid during [`SaveTarget::save`].
    pub fn path(&self) -> &Path {
        self.path
    }

    /// Name the user asked the export to be saved as.
    pub fn file_name(&self) -> &str {
        self.file_name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedExport {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Reject names that are empty or would escape the save directory.
pub fn validate_file_name(name: &str) -> Result<(), ExportError> {
    let invalid = |reason: &str| ExportError::InvalidFileName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(invalid("must not contain path separators"));
    }
    if name == "." || name == ".." {
        return Err(invalid("must name a file"));
    }
    Ok(())
}

pub struct ExportPipeline {
    target: Arc<dyn SaveTarget>,
}

impl ExportPipeline {
    pub fn new(target: Arc<dyn SaveTarget>) -> Self {
        Self { target }
    }

    /// Park `payload` in a temporary file, run the save interaction, then
    /// remove the temporary file on every path out.
    pub fn deliver(&self, payload: &[u8], file_name: &str) -> Result<SavedExport, ExportError> {
        validate_file_name(file_name)?;

        let mut transient = tempfile::Builder::new()
            .prefix("ghostdash-export-")
            .tempfile()?;
        transient.write_all(payload)?;
        transient.flush()?;

        debug!(
            event = "core.export.transient_acquired",
            path = %transient.path().display(),
            bytes = payload.len()
        );

        let result = self.target.save(&TransientExport {
            path: transient.path(),
            file_name,
            len: payload.len(),
        });

        let transient_path = transient.path().to_path_buf();
        if let Err(e) = transient.close() {
            warn!(
                event = "core.export.transient_release_failed",
                path = %transient_path.display(),
                error = %e
            );
        } else {
            debug!(
                event = "core.export.transient_released",
                path = %transient_path.display()
            );
        }

        let path = result?;
        info!(
            event = "core.export.saved",
            path = %path.display(),
            bytes = payload.len()
        );
        Ok(SavedExport {
            path,
            bytes: payload.len(),
        })
    }
}
