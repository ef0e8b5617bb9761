use thiserror::Error;

/// Fatal conditions of the viewer pipeline outside the file loader.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("No file was selected.")]
    NoFileSelected,
    #[error("no stream name contains \"pupil\" (found: {})", .available.join(", "))]
    MissingPupilStream { available: Vec<String> },
    #[error("pupil stream {0:?} has no samples")]
    EmptyPupilStream(String),
    #[error("pupil stream {0:?} has no channels")]
    NoPupilChannels(String),
    #[error("pupil stream {0:?} carries text samples, expected numbers")]
    NonNumericPupilStream(String),
    #[error("plot window failed: {0}")]
    Render(String),
}
