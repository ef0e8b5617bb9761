use std::fmt;

// ---------------------------------------------------------------------------
// ChannelFormat – on-disk value type of a stream
// ---------------------------------------------------------------------------

/// Value type of every channel in a stream, as declared in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFormat {
    Float32,
    Double64,
    Int8,
    Int16,
    Int32,
    Int64,
    String,
}

impl ChannelFormat {
    /// Parse the `channel_format` text of a stream header.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "float32" => Some(ChannelFormat::Float32),
            "double64" => Some(ChannelFormat::Double64),
            "int8" => Some(ChannelFormat::Int8),
            "int16" => Some(ChannelFormat::Int16),
            "int32" => Some(ChannelFormat::Int32),
            "int64" => Some(ChannelFormat::Int64),
            "string" => Some(ChannelFormat::String),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelFormat::Float32 => "float32",
            ChannelFormat::Double64 => "double64",
            ChannelFormat::Int8 => "int8",
            ChannelFormat::Int16 => "int16",
            ChannelFormat::Int32 => "int32",
            ChannelFormat::Int64 => "int64",
            ChannelFormat::String => "string",
        }
    }
}

impl fmt::Display for ChannelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StreamInfo – header metadata of one stream
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub name: String,
    /// Content type, e.g. `"Gaze"` or `"Markers"`.
    pub stream_type: String,
    pub channel_count: usize,
    /// Declared sampling rate; `0.0` marks an irregular stream.
    pub nominal_srate: f64,
    pub channel_format: ChannelFormat,
    pub source_id: String,
}

impl StreamInfo {
    pub fn new(name: &str, channel_count: usize, channel_format: ChannelFormat) -> Self {
        StreamInfo {
            name: name.to_string(),
            stream_type: String::new(),
            channel_count,
            nominal_srate: 0.0,
            channel_format,
            source_id: String::new(),
        }
    }

    pub fn with_type(mut self, stream_type: &str) -> Self {
        self.stream_type = stream_type.to_string();
        self
    }

    pub fn with_srate(mut self, nominal_srate: f64) -> Self {
        self.nominal_srate = nominal_srate;
        self
    }

    pub fn is_regular(&self) -> bool {
        self.nominal_srate > 0.0
    }
}

// ---------------------------------------------------------------------------
// TimeSeries – sample rows of a stream
// ---------------------------------------------------------------------------

/// Sample rows (one per time point), columns are channels.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSeries {
    Numeric(Vec<Vec<f64>>),
    Text(Vec<Vec<String>>),
}

impl TimeSeries {
    pub fn empty_for(format: ChannelFormat) -> Self {
        match format {
            ChannelFormat::String => TimeSeries::Text(Vec::new()),
            _ => TimeSeries::Numeric(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TimeSeries::Numeric(rows) => rows.len(),
            TimeSeries::Text(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label carried by row `i`: the sole element of a one-channel row,
    /// the first element of a wider row, empty for a zero-channel row.
    pub fn row_label(&self, i: usize) -> Option<String> {
        match self {
            TimeSeries::Numeric(rows) => rows.get(i).map(|row| unwrap_label(row)),
            TimeSeries::Text(rows) => rows.get(i).map(|row| unwrap_label(row)),
        }
    }
}

/// Reduce a sample row to a single label value.
pub fn unwrap_label<T: ToString>(row: &[T]) -> String {
    row.first().map(ToString::to_string).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stream – one named channel group of a recording
// ---------------------------------------------------------------------------

/// One clock-offset measurement (seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockOffset {
    pub collection_time: f64,
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub info: StreamInfo,
    pub time_series: TimeSeries,
    /// One timestamp per row of `time_series`.
    pub time_stamps: Vec<f64>,
    pub clock_offsets: Vec<ClockOffset>,
}

impl Stream {
    /// Stream with numeric rows. Returns `None` when row and timestamp
    /// counts differ.
    pub fn numeric(info: StreamInfo, rows: Vec<Vec<f64>>, time_stamps: Vec<f64>) -> Option<Self> {
        (rows.len() == time_stamps.len()).then(|| Stream {
            info,
            time_series: TimeSeries::Numeric(rows),
            time_stamps,
            clock_offsets: Vec::new(),
        })
    }

    /// Stream with text rows. Returns `None` when row and timestamp
    /// counts differ.
    pub fn text(info: StreamInfo, rows: Vec<Vec<String>>, time_stamps: Vec<f64>) -> Option<Self> {
        (rows.len() == time_stamps.len()).then(|| Stream {
            info,
            time_series: TimeSeries::Text(rows),
            time_stamps,
            clock_offsets: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn len(&self) -> usize {
        self.time_stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_stamps.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Recording – the complete loaded file
// ---------------------------------------------------------------------------

/// Session-level metadata from the file header chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileHeader {
    pub version: Option<String>,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    pub header: FileHeader,
    /// Streams in the order their headers appear in the file.
    pub streams: Vec<Stream>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_format_names_round_trip() {
        for name in ["float32", "double64", "int8", "int16", "int32", "int64", "string"] {
            let format = ChannelFormat::parse(name).unwrap();
            assert_eq!(format.as_str(), name);
        }
        assert_eq!(ChannelFormat::parse("undefined"), None);
    }

    #[test]
    fn stream_constructors_reject_length_mismatch() {
        let info = StreamInfo::new("Pupil", 1, ChannelFormat::Float32);
        assert!(Stream::numeric(info.clone(), vec![vec![1.0]], vec![]).is_none());
        assert!(Stream::numeric(info, vec![vec![1.0]], vec![0.5]).is_some());
    }

    #[test]
    fn row_label_takes_first_element() {
        let series = TimeSeries::Text(vec![
            vec!["Stimulus_A".to_string()],
            vec!["Go".to_string(), "extra".to_string()],
            vec![],
        ]);
        assert_eq!(series.row_label(0).as_deref(), Some("Stimulus_A"));
        assert_eq!(series.row_label(1).as_deref(), Some("Go"));
        assert_eq!(series.row_label(2).as_deref(), Some(""));
        assert_eq!(series.row_label(3), None);
    }

    #[test]
    fn numeric_labels_use_display_formatting() {
        let series = TimeSeries::Numeric(vec![vec![7.0], vec![2.5]]);
        assert_eq!(series.row_label(0).as_deref(), Some("7"));
        assert_eq!(series.row_label(1).as_deref(), Some("2.5"));
    }
}
