use std::path::PathBuf;

use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Ask the user for an XDF recording. Cancelling is fatal.
pub fn select_xdf_file() -> Result<PathBuf, ViewerError> {
    let file = rfd::FileDialog::new()
        .set_title("Select XDF file")
        .add_filter("XDF files", &["xdf"])
        .add_filter("All files", &["*"])
        .pick_file();

    match file {
        Some(path) => {
            log::info!("Selected {}", path.display());
            Ok(path)
        }
        None => Err(ViewerError::NoFileSelected),
    }
}
