use std::io;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use xmltree::{Element, XMLNode};

use super::model::{ChannelFormat, Recording, Stream, TimeSeries};
use super::xdf::{tag, MAGIC};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Serialize a recording as an XDF file.
pub fn write_file(path: &Path, recording: &Recording) -> io::Result<()> {
    std::fs::write(path, encode(recording)?)
}

/// Serialize a recording into XDF bytes.
///
/// Stream ids are assigned 1, 2, ... in stream order. Each stream gets one
/// header chunk, one samples chunk with explicit timestamps, its clock
/// offsets and a footer.
pub fn encode(recording: &Recording) -> io::Result<Vec<u8>> {
    let mut out = MAGIC.to_vec();

    let mut header = Element::new("info");
    push_text(
        &mut header,
        "version",
        recording.header.version.as_deref().unwrap_or("1.0"),
    );
    if let Some(datetime) = &recording.header.datetime {
        push_text(&mut header, "datetime", datetime);
    }
    push_chunk(&mut out, tag::FILE_HEADER, &xml_bytes(&header)?)?;

    for (i, stream) in recording.streams.iter().enumerate() {
        let id = u32::try_from(i + 1)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many streams"))?;

        let mut content = Vec::new();
        content.write_u32::<LittleEndian>(id)?;
        content.extend_from_slice(&xml_bytes(&stream_header(stream))?);
        push_chunk(&mut out, tag::STREAM_HEADER, &content)?;

        let mut content = Vec::new();
        content.write_u32::<LittleEndian>(id)?;
        push_varlen(&mut content, stream.len() as u64)?;
        write_samples(&mut content, stream)?;
        push_chunk(&mut out, tag::SAMPLES, &content)?;

        for offset in &stream.clock_offsets {
            let mut content = Vec::new();
            content.write_u32::<LittleEndian>(id)?;
            content.write_f64::<LittleEndian>(offset.collection_time)?;
            content.write_f64::<LittleEndian>(offset.offset)?;
            push_chunk(&mut out, tag::CLOCK_OFFSET, &content)?;
        }

        let mut content = Vec::new();
        content.write_u32::<LittleEndian>(id)?;
        content.extend_from_slice(&xml_bytes(&stream_footer(stream))?);
        push_chunk(&mut out, tag::STREAM_FOOTER, &content)?;
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Chunk framing
// ---------------------------------------------------------------------------

/// Append a variable-length integer using the narrowest width.
pub(crate) fn push_varlen(out: &mut Vec<u8>, value: u64) -> io::Result<()> {
    if let Ok(v) = u8::try_from(value) {
        out.write_u8(1)?;
        out.write_u8(v)
    } else if let Ok(v) = u32::try_from(value) {
        out.write_u8(4)?;
        out.write_u32::<LittleEndian>(v)
    } else {
        out.write_u8(8)?;
        out.write_u64::<LittleEndian>(value)
    }
}

/// Append one chunk: length (tag + content), tag, content.
pub(crate) fn push_chunk(out: &mut Vec<u8>, chunk_tag: u16, content: &[u8]) -> io::Result<()> {
    push_varlen(out, content.len() as u64 + 2)?;
    out.write_u16::<LittleEndian>(chunk_tag)?;
    out.extend_from_slice(content);
    Ok(())
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

fn write_samples(out: &mut Vec<u8>, stream: &Stream) -> io::Result<()> {
    let info = &stream.info;
    let width_error = |row: usize, len: usize| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "stream {:?} row {row} has {len} values, expected {}",
                info.name, info.channel_count
            ),
        )
    };

    match &stream.time_series {
        TimeSeries::Numeric(rows) => {
            if info.channel_format == ChannelFormat::String {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("stream {:?} declares string format for numeric rows", info.name),
                ));
            }
            for (i, (row, stamp)) in rows.iter().zip(&stream.time_stamps).enumerate() {
                if row.len() != info.channel_count {
                    return Err(width_error(i, row.len()));
                }
                push_stamp(out, *stamp)?;
                for &value in row {
                    push_value(out, info.channel_format, value)?;
                }
            }
        }
        TimeSeries::Text(rows) => {
            if info.channel_format != ChannelFormat::String {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "stream {:?} has text rows but format {}",
                        info.name, info.channel_format
                    ),
                ));
            }
            for (i, (row, stamp)) in rows.iter().zip(&stream.time_stamps).enumerate() {
                if row.len() != info.channel_count {
                    return Err(width_error(i, row.len()));
                }
                push_stamp(out, *stamp)?;
                for value in row {
                    push_varlen(out, value.len() as u64)?;
                    out.extend_from_slice(value.as_bytes());
                }
            }
        }
    }
    Ok(())
}

fn push_stamp(out: &mut Vec<u8>, stamp: f64) -> io::Result<()> {
    out.write_u8(8)?;
    out.write_f64::<LittleEndian>(stamp)
}

fn push_value(out: &mut Vec<u8>, format: ChannelFormat, value: f64) -> io::Result<()> {
    match format {
        ChannelFormat::Float32 => out.write_f32::<LittleEndian>(value as f32),
        ChannelFormat::Double64 => out.write_f64::<LittleEndian>(value),
        ChannelFormat::Int8 => out.write_i8(value as i8),
        ChannelFormat::Int16 => out.write_i16::<LittleEndian>(value as i16),
        ChannelFormat::Int32 => out.write_i32::<LittleEndian>(value as i32),
        ChannelFormat::Int64 => out.write_i64::<LittleEndian>(value as i64),
        // Rejected by `write_samples` before any value is written.
        ChannelFormat::String => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// XML
// ---------------------------------------------------------------------------

fn push_text(parent: &mut Element, name: &str, text: &str) {
    let mut child = Element::new(name);
    if !text.is_empty() {
        child.children.push(XMLNode::Text(text.to_string()));
    }
    parent.children.push(XMLNode::Element(child));
}

fn stream_header(stream: &Stream) -> Element {
    let info = &stream.info;
    let mut el = Element::new("info");
    push_text(&mut el, "name", &info.name);
    push_text(&mut el, "type", &info.stream_type);
    push_text(&mut el, "channel_count", &info.channel_count.to_string());
    push_text(&mut el, "nominal_srate", &info.nominal_srate.to_string());
    push_text(&mut el, "channel_format", info.channel_format.as_str());
    push_text(&mut el, "source_id", &info.source_id);
    el
}

fn stream_footer(stream: &Stream) -> Element {
    let mut el = Element::new("info");
    if let (Some(first), Some(last)) = (stream.time_stamps.first(), stream.time_stamps.last()) {
        push_text(&mut el, "first_timestamp", &first.to_string());
        push_text(&mut el, "last_timestamp", &last.to_string());
    }
    push_text(&mut el, "sample_count", &stream.len().to_string());
    el
}

fn xml_bytes(el: &Element) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    el.write(&mut buf)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{FileHeader, StreamInfo};

    #[test]
    fn varlen_uses_narrowest_width() {
        let mut out = Vec::new();
        push_varlen(&mut out, 200).unwrap();
        push_varlen(&mut out, 70_000).unwrap();
        assert_eq!(out[..2], [1, 200]);
        assert_eq!(out[2], 4);
        assert_eq!(out[3..7], 70_000u32.to_le_bytes());
    }

    #[test]
    fn rejects_rows_of_wrong_width() {
        let stream = Stream::numeric(
            StreamInfo::new("Pupil", 2, ChannelFormat::Float32),
            vec![vec![1.0]],
            vec![0.0],
        )
        .unwrap();
        let recording = Recording {
            header: FileHeader::default(),
            streams: vec![stream],
        };
        let err = encode(&recording).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
