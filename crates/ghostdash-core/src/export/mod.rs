//! Export Pipeline: hand a downloaded payload to the host for saving.
//!
//! The payload is parked in a temporary file for exactly as long as the
//! save interaction runs; the file is removed afterwards whether the save
//! succeeded or not.

mod errors;
mod pipeline;
mod target;

pub use errors::ExportError;
pub use pipeline::{ExportPipeline, SavedExport, TransientExport, validate_file_name};
pub use target::{DirectorySaveTarget, SaveTarget};
