use std::path::PathBuf;

use crate::data::extract::PupilSession;
use crate::data::model::{ChannelFormat, FileHeader, Recording};
use crate::ui::hover::MarkerLines;

// ---------------------------------------------------------------------------
// Stream summaries for the side panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    Pupil,
    Markers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    pub name: String,
    pub stream_type: String,
    pub channel_count: usize,
    pub channel_format: ChannelFormat,
    pub nominal_srate: f64,
    pub samples: usize,
    pub role: Option<StreamRole>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Everything the window renders. Built once before the window opens.
pub struct AppState {
    pub source: PathBuf,
    pub header: FileHeader,
    pub streams: Vec<StreamSummary>,
    pub session: PupilSession,
    pub marker_lines: MarkerLines,
    /// Hover distance to a marker line, in screen pixels.
    pub hover_radius: f32,
}

impl AppState {
    pub fn new(
        source: PathBuf,
        recording: &Recording,
        session: PupilSession,
        hover_radius: f32,
    ) -> Self {
        let streams = recording
            .streams
            .iter()
            .enumerate()
            .map(|(i, stream)| StreamSummary {
                name: stream.info.name.clone(),
                stream_type: stream.info.stream_type.clone(),
                channel_count: stream.info.channel_count,
                channel_format: stream.info.channel_format,
                nominal_srate: stream.info.nominal_srate,
                samples: stream.len(),
                role: if i == session.pupil_index {
                    Some(StreamRole::Pupil)
                } else if Some(i) == session.marker_index {
                    Some(StreamRole::Markers)
                } else {
                    None
                },
            })
            .collect();

        Self {
            source,
            header: recording.header.clone(),
            streams,
            marker_lines: MarkerLines::from_markers(&session.markers),
            session,
            hover_radius,
        }
    }

    /// File name for titles, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}
