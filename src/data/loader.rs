use std::path::{Path, PathBuf};

use thiserror::Error;

use super::model::Recording;
use super::sync;
use super::xdf::{self, FormatError};

// ---------------------------------------------------------------------------
// Options and errors
// ---------------------------------------------------------------------------

/// Timestamp post-processing applied after decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Apply recorded clock offsets to every stream.
    pub synchronize_clocks: bool,
    /// Regularize timestamps of streams with a nominal sampling rate.
    pub dejitter: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            synchronize_clocks: true,
            dejitter: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a valid XDF file", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an XDF recording from disk.
///
/// The extension is not checked; anything that decodes as XDF is accepted.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Recording, LoadError> {
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let recording = load_bytes(&data, options).map_err(|source| LoadError::Format {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Loaded {} streams from {} ({} bytes)",
        recording.len(),
        path.display(),
        data.len()
    );
    Ok(recording)
}

/// Decode XDF bytes and post-process the timestamps.
pub fn load_bytes(data: &[u8], options: &LoadOptions) -> Result<Recording, FormatError> {
    let mut recording = xdf::decode(data)?;

    for stream in &mut recording.streams {
        if options.synchronize_clocks && !stream.clock_offsets.is_empty() {
            log::debug!(
                "synchronizing {:?} with {} clock offsets",
                stream.info.name,
                stream.clock_offsets.len()
            );
            sync::synchronize_clocks(stream);
        }
        if options.dejitter {
            sync::dejitter(stream);
        }
    }
    Ok(recording)
}
