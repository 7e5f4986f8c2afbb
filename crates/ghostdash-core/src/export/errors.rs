use crate::errors::GhostdashError;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Invalid export file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: String },

    #[error("Failed to save export: {message}")]
    SaveFailed { message: String },

    #[error("IO error during export: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl GhostdashError for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            ExportError::InvalidFileName { .. } => "EXPORT_INVALID_FILE_NAME",
            ExportError::SaveFailed { .. } => "EXPORT_SAVE_FAILED",
            ExportError::IoError { .. } => "EXPORT_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ExportError::InvalidFileName { .. })
    }
}
