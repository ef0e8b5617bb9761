use crate::error::ViewerError;

use super::model::{Recording, Stream, TimeSeries};

// ---------------------------------------------------------------------------
// Extracted session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Rebase pupil timestamps even when the recording has no marker stream.
    pub always_rebase: bool,
}

/// One labelled event.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Seconds relative to the first pupil sample.
    pub time: f64,
    pub label: String,
}

/// Pupil channels and markers ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct PupilSession {
    /// Index of the pupil stream in the recording.
    pub pupil_index: usize,
    pub pupil_stream: String,
    pub marker_index: Option<usize>,
    pub marker_stream: Option<String>,
    /// Pupil timestamps, relative when `start_time` is set, raw otherwise.
    pub time: Vec<f64>,
    pub left: Vec<f64>,
    /// Absent for single-channel pupil streams.
    pub right: Option<Vec<f64>>,
    /// In arrival order.
    pub markers: Vec<Marker>,
    /// Raw timestamp subtracted from all times, if rebased.
    pub start_time: Option<f64>,
}

// ---------------------------------------------------------------------------
// Stream classification
// ---------------------------------------------------------------------------

const PUPIL_KEYS: &[&str] = &["pupil"];
const MARKER_KEYS: &[&str] = &["marker", "event"];

/// Names of all streams in file order.
pub fn stream_names(recording: &Recording) -> Vec<&str> {
    recording.streams.iter().map(Stream::name).collect()
}

fn name_matches(stream: &Stream, keys: &[&str]) -> bool {
    let name = stream.name().to_lowercase();
    keys.iter().any(|key| name.contains(key))
}

fn find_stream<'r>(streams: &'r [Stream], keys: &[&str]) -> Option<(usize, &'r Stream)> {
    streams
        .iter()
        .enumerate()
        .find(|(_, stream)| name_matches(stream, keys))
}

/// First stream whose name contains "pupil", ignoring case.
pub fn find_pupil_stream(streams: &[Stream]) -> Option<(usize, &Stream)> {
    find_stream(streams, PUPIL_KEYS)
}

/// First stream whose name contains "marker" or "event", ignoring case.
pub fn find_marker_stream(streams: &[Stream]) -> Option<(usize, &Stream)> {
    find_stream(streams, MARKER_KEYS)
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Select the pupil and marker streams and build the plot data.
///
/// Timestamps are rebased to the first pupil sample only when a marker
/// stream exists (or `always_rebase` is set); without markers the pupil
/// timestamps keep their recorded values.
pub fn extract_session(
    recording: &Recording,
    options: &ExtractOptions,
) -> Result<PupilSession, ViewerError> {
    let Some((pupil_index, pupil)) = find_pupil_stream(&recording.streams) else {
        let available = stream_names(recording)
            .into_iter()
            .map(String::from)
            .collect();
        return Err(ViewerError::MissingPupilStream { available });
    };
    let marker = find_marker_stream(&recording.streams);

    let (left, right) = split_channels(pupil)?;
    log::info!(
        "Pupil stream {:?}: {} samples, {}",
        pupil.name(),
        left.len(),
        if right.is_some() {
            "left + right"
        } else {
            "left only"
        }
    );

    let mut time = pupil.time_stamps.clone();
    let start_time = if marker.is_some() || options.always_rebase {
        time.first().copied()
    } else {
        log::info!("No marker stream found; pupil timestamps are not rebased");
        None
    };
    if let Some(start) = start_time {
        for t in &mut time {
            *t -= start;
        }
    }

    let markers = match (marker, start_time) {
        (Some((_, stream)), Some(start)) => collect_markers(stream, start),
        _ => Vec::new(),
    };
    if let Some((_, stream)) = marker {
        log::info!("Marker stream {:?}: {} markers", stream.name(), markers.len());
    }

    Ok(PupilSession {
        pupil_index,
        pupil_stream: pupil.name().to_string(),
        marker_index: marker.map(|(i, _)| i),
        marker_stream: marker.map(|(_, s)| s.name().to_string()),
        time,
        left,
        right,
        markers,
        start_time,
    })
}

/// Left pupil from column 0, right pupil from column 1 when present.
fn split_channels(stream: &Stream) -> Result<(Vec<f64>, Option<Vec<f64>>), ViewerError> {
    let rows = match &stream.time_series {
        TimeSeries::Numeric(rows) => rows,
        TimeSeries::Text(_) => {
            return Err(ViewerError::NonNumericPupilStream(stream.name().to_string()))
        }
    };
    if rows.is_empty() {
        return Err(ViewerError::EmptyPupilStream(stream.name().to_string()));
    }
    let columns = rows.iter().map(Vec::len).min().unwrap_or(0);
    if columns == 0 {
        return Err(ViewerError::NoPupilChannels(stream.name().to_string()));
    }

    let left = rows.iter().map(|row| row[0]).collect();
    let right = (columns >= 2).then(|| rows.iter().map(|row| row[1]).collect());
    Ok((left, right))
}

fn collect_markers(stream: &Stream, start_time: f64) -> Vec<Marker> {
    stream
        .time_stamps
        .iter()
        .enumerate()
        .map(|(i, &t)| Marker {
            time: t - start_time,
            label: stream.time_series.row_label(i).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ChannelFormat, FileHeader, StreamInfo};

    fn numeric(name: &str, rows: Vec<Vec<f64>>, times: Vec<f64>) -> Stream {
        let channels = rows.first().map_or(1, Vec::len);
        Stream::numeric(StreamInfo::new(name, channels, ChannelFormat::Float32), rows, times)
            .unwrap()
    }

    fn text(name: &str, labels: &[&str], times: Vec<f64>) -> Stream {
        let rows = labels.iter().map(|l| vec![l.to_string()]).collect();
        Stream::text(StreamInfo::new(name, 1, ChannelFormat::String), rows, times).unwrap()
    }

    fn recording(streams: Vec<Stream>) -> Recording {
        Recording {
            header: FileHeader::default(),
            streams,
        }
    }

    #[test]
    fn selects_streams_by_name_ignoring_case() {
        let rec = recording(vec![
            numeric("EEG", vec![vec![1.0]], vec![0.0]),
            text("MarkerStream", &["a"], vec![0.0]),
            numeric("Pupil_L_R", vec![vec![3.0, 3.1]], vec![0.0]),
        ]);
        assert_eq!(find_pupil_stream(&rec.streams).map(|(i, _)| i), Some(2));
        assert_eq!(find_marker_stream(&rec.streams).map(|(i, _)| i), Some(1));

        let shouting = recording(vec![
            numeric("PUPIL", vec![vec![1.0]], vec![0.0]),
            text("EVENTS", &["a"], vec![0.0]),
        ]);
        assert!(find_pupil_stream(&shouting.streams).is_some());
        assert!(find_marker_stream(&shouting.streams).is_some());
    }

    #[test]
    fn first_matching_stream_wins() {
        let rec = recording(vec![
            numeric("pupil_a", vec![vec![1.0]], vec![0.0]),
            numeric("pupil_b", vec![vec![2.0]], vec![0.0]),
        ]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        assert_eq!(session.pupil_stream, "pupil_a");
        assert_eq!(session.left, vec![1.0]);
    }

    #[test]
    fn single_channel_has_no_right_pupil() {
        let rec = recording(vec![numeric("Pupil", vec![vec![3.0], vec![3.2]], vec![1.0, 2.0])]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        assert_eq!(session.left, vec![3.0, 3.2]);
        assert_eq!(session.right, None);
    }

    #[test]
    fn extra_channels_beyond_two_are_ignored() {
        let rec = recording(vec![numeric(
            "Pupil",
            vec![vec![3.0, 3.1, 9.0], vec![3.2, 3.3, 9.0]],
            vec![1.0, 2.0],
        )]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        assert_eq!(session.right, Some(vec![3.1, 3.3]));
    }

    #[test]
    fn rebases_only_when_markers_exist() {
        let with_markers = recording(vec![
            numeric("Pupil", vec![vec![3.0], vec![3.1]], vec![100.0, 100.5]),
            text("Events", &["go"], vec![100.25]),
        ]);
        let session = extract_session(&with_markers, &ExtractOptions::default()).unwrap();
        assert_eq!(session.start_time, Some(100.0));
        assert_eq!(session.time, vec![0.0, 0.5]);
        assert_eq!(session.markers[0].time, 0.25);

        let without = recording(vec![numeric(
            "Pupil",
            vec![vec![3.0], vec![3.1]],
            vec![100.0, 100.5],
        )]);
        let session = extract_session(&without, &ExtractOptions::default()).unwrap();
        assert_eq!(session.start_time, None);
        assert_eq!(session.time, vec![100.0, 100.5]);
        assert!(session.markers.is_empty());
    }

    #[test]
    fn empty_marker_stream_still_triggers_rebasing() {
        let rec = recording(vec![
            numeric("Pupil", vec![vec![3.0], vec![3.1]], vec![100.0, 100.5]),
            text("Events", &[], vec![]),
        ]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        assert_eq!(session.marker_stream.as_deref(), Some("Events"));
        assert_eq!(session.start_time, Some(100.0));
        assert_eq!(session.time, vec![0.0, 0.5]);
        assert!(session.markers.is_empty());
    }

    #[test]
    fn always_rebase_rebases_without_markers() {
        let rec = recording(vec![numeric("Pupil", vec![vec![3.0], vec![3.1]], vec![7.0, 8.0])]);
        let options = ExtractOptions {
            always_rebase: true,
        };
        let session = extract_session(&rec, &options).unwrap();
        assert_eq!(session.time, vec![0.0, 1.0]);
    }

    #[test]
    fn unwraps_marker_labels() {
        let rec = recording(vec![
            numeric("Pupil", vec![vec![3.0]], vec![0.0]),
            text("Markers", &["Stimulus_A"], vec![1.0]),
        ]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        assert_eq!(session.markers[0].label, "Stimulus_A");
    }

    #[test]
    fn numeric_markers_become_text_labels() {
        let rec = recording(vec![
            numeric("Pupil", vec![vec![3.0]], vec![0.0]),
            numeric("event_codes", vec![vec![12.0], vec![13.0]], vec![1.0, 2.0]),
        ]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        let labels: Vec<&str> = session.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["12", "13"]);
    }

    #[test]
    fn duplicate_and_unsorted_markers_are_kept_in_order() {
        let rec = recording(vec![
            numeric("Pupil", vec![vec![3.0]], vec![0.0]),
            text("Markers", &["b", "a", "a"], vec![2.0, 1.0, 1.0]),
        ]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        let times: Vec<f64> = session.markers.iter().map(|m| m.time).collect();
        assert_eq!(times, vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn missing_pupil_stream_is_a_named_error() {
        let rec = recording(vec![
            numeric("EEG", vec![vec![1.0]], vec![0.0]),
            text("Markers", &["a"], vec![0.0]),
        ]);
        let err = extract_session(&rec, &ExtractOptions::default()).unwrap_err();
        match err {
            ViewerError::MissingPupilStream { available } => {
                assert_eq!(available, ["EEG", "Markers"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_or_text_pupil_streams_are_rejected() {
        let empty = recording(vec![numeric("Pupil", vec![], vec![])]);
        assert!(matches!(
            extract_session(&empty, &ExtractOptions::default()),
            Err(ViewerError::EmptyPupilStream(_))
        ));

        let channelless = recording(vec![numeric("Pupil", vec![vec![], vec![]], vec![0.0, 1.0])]);
        let err = extract_session(&channelless, &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ViewerError::NoPupilChannels(_)));
        assert!(err.to_string().contains("no channels"));

        let textual = recording(vec![text("Pupil", &["wide"], vec![0.0])]);
        assert!(matches!(
            extract_session(&textual, &ExtractOptions::default()),
            Err(ViewerError::NonNumericPupilStream(_))
        ));
    }

    #[test]
    fn end_to_end_scenario() {
        let rec = recording(vec![
            numeric(
                "EyeTracker_Pupil",
                vec![vec![3.0, 3.1], vec![3.2, 3.3]],
                vec![10.0, 10.5],
            ),
            text("Markers", &["Start", "Stop"], vec![10.0, 10.5]),
        ]);
        let session = extract_session(&rec, &ExtractOptions::default()).unwrap();
        assert_eq!(session.left, vec![3.0, 3.2]);
        assert_eq!(session.right, Some(vec![3.1, 3.3]));
        assert_eq!(session.time, vec![0.0, 0.5]);
        let marker_times: Vec<f64> = session.markers.iter().map(|m| m.time).collect();
        let labels: Vec<&str> = session.markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(marker_times, vec![0.0, 0.5]);
        assert_eq!(labels, ["Start", "Stop"]);
    }
}
