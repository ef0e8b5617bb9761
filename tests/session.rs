use std::error::Error;

use pupil_marker_viewer::data::extract::{extract_session, stream_names, ExtractOptions};
use pupil_marker_viewer::data::loader::{load_file, LoadError, LoadOptions};
use pupil_marker_viewer::data::model::{ChannelFormat, FileHeader, Recording, Stream, StreamInfo};
use pupil_marker_viewer::data::writer::write_file;
use pupil_marker_viewer::error::ViewerError;
use pupil_marker_viewer::ui::hover::MarkerLines;

fn pupil(name: &str, rows: Vec<Vec<f64>>, times: Vec<f64>) -> Stream {
    let channels = rows.first().map_or(1, Vec::len);
    Stream::numeric(StreamInfo::new(name, channels, ChannelFormat::Double64), rows, times)
        .expect("rows and timestamps line up")
}

fn markers(name: &str, labels: &[&str], times: Vec<f64>) -> Stream {
    let rows = labels.iter().map(|l| vec![l.to_string()]).collect();
    Stream::text(StreamInfo::new(name, 1, ChannelFormat::String), rows, times)
        .expect("rows and timestamps line up")
}

fn write_and_load(streams: Vec<Stream>) -> Result<Recording, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.xdf");
    let recording = Recording {
        header: FileHeader {
            version: Some("1.0".to_string()),
            datetime: None,
        },
        streams,
    };
    write_file(&path, &recording)?;
    Ok(load_file(&path, &LoadOptions::default())?)
}

#[test]
fn end_to_end_from_disk() -> Result<(), Box<dyn Error>> {
    let recording = write_and_load(vec![
        pupil(
            "EyeTracker_Pupil",
            vec![vec![3.0, 3.1], vec![3.2, 3.3]],
            vec![10.0, 10.5],
        ),
        markers("Markers", &["Start", "Stop"], vec![10.0, 10.5]),
    ])?;
    assert_eq!(stream_names(&recording), ["EyeTracker_Pupil", "Markers"]);

    let session = extract_session(&recording, &ExtractOptions::default())?;
    assert_eq!(session.left, vec![3.0, 3.2]);
    assert_eq!(session.right, Some(vec![3.1, 3.3]));
    assert_eq!(session.time, vec![0.0, 0.5]);

    let lines = MarkerLines::from_markers(&session.markers);
    let placed: Vec<(f64, &str)> = lines
        .positions()
        .map(|(id, x)| (x, lines.label(id).unwrap_or_default()))
        .collect();
    assert_eq!(placed, vec![(0.0, "Start"), (0.5, "Stop")]);
    Ok(())
}

#[test]
fn ignores_unrelated_streams() -> Result<(), Box<dyn Error>> {
    let recording = write_and_load(vec![
        pupil("EEG", vec![vec![1.0, 2.0, 3.0]], vec![0.0]),
        pupil("Pupil_L_R", vec![vec![4.0, 4.5]], vec![2.0]),
        markers("MarkerStream", &["cue"], vec![3.0]),
    ])?;
    let session = extract_session(&recording, &ExtractOptions::default())?;
    assert_eq!(session.pupil_stream, "Pupil_L_R");
    assert_eq!(session.marker_stream.as_deref(), Some("MarkerStream"));
    assert_eq!(session.markers[0].time, 1.0);
    Ok(())
}

#[test]
fn recording_without_pupil_stream_fails_by_name() -> Result<(), Box<dyn Error>> {
    let recording = write_and_load(vec![markers("Events", &["a"], vec![1.0])])?;
    let err = extract_session(&recording, &ExtractOptions::default()).unwrap_err();
    assert!(matches!(err, ViewerError::MissingPupilStream { .. }));
    assert!(err.to_string().contains("pupil"));
    Ok(())
}

#[test]
fn non_xdf_file_is_a_format_error() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.xdf");
    std::fs::write(&path, "pupil,time\n3.0,0.0\n")?;
    let err = load_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Format { .. }));
    Ok(())
}
