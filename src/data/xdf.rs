use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;
use xmltree::Element;

use super::model::{
    ChannelFormat, ClockOffset, FileHeader, Recording, Stream, StreamInfo, TimeSeries,
};

// ---------------------------------------------------------------------------
// Container constants
// ---------------------------------------------------------------------------

pub const MAGIC: &[u8; 4] = b"XDF:";

/// Chunk tags.
pub mod tag {
    pub const FILE_HEADER: u16 = 1;
    pub const STREAM_HEADER: u16 = 2;
    pub const SAMPLES: u16 = 3;
    pub const CLOCK_OFFSET: u16 = 4;
    pub const BOUNDARY: u16 = 5;
    pub const STREAM_FOOTER: u16 = 6;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("missing \"XDF:\" magic number")]
    BadMagic,
    #[error("unexpected end of data")]
    Truncated(#[from] io::Error),
    #[error("invalid length width {width} at byte {offset}")]
    InvalidLengthWidth { width: u8, offset: u64 },
    #[error("invalid timestamp width {width} at byte {offset}")]
    InvalidTimestampWidth { width: u8, offset: u64 },
    #[error("chunk at byte {offset} declares length {length}, too short for a tag")]
    ShortChunk { offset: u64, length: u64 },
    #[error("invalid XML in {context}: {message}")]
    Xml {
        context: &'static str,
        message: String,
    },
    #[error("stream header is missing <{0}>")]
    MissingField(&'static str),
    #[error("invalid value {value:?} for <{field}>")]
    InvalidField { field: &'static str, value: String },
    #[error("unsupported channel format {0:?}")]
    UnsupportedChannelFormat(String),
    #[error("chunk refers to undeclared stream {0}")]
    UnknownStream(u32),
    #[error("stream {0} is declared twice")]
    DuplicateStream(u32),
    #[error("string sample at byte {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u64 },
    #[error("file has no header chunk")]
    MissingFileHeader,
}

type Result<T> = std::result::Result<T, FormatError>;

/// Positions are absolute file offsets; a chunk reader is cut off at the
/// end of its chunk.
type Reader<'a> = Cursor<&'a [u8]>;

fn unexpected_eof() -> FormatError {
    FormatError::Truncated(io::ErrorKind::UnexpectedEof.into())
}

// ---------------------------------------------------------------------------
// Primitive reads
// ---------------------------------------------------------------------------

/// Variable-length integer: one width byte (1, 4 or 8) then the value.
fn read_varlen(r: &mut Reader<'_>) -> Result<u64> {
    let offset = r.position();
    match r.read_u8()? {
        1 => Ok(u64::from(r.read_u8()?)),
        4 => Ok(u64::from(r.read_u32::<LittleEndian>()?)),
        8 => Ok(r.read_u64::<LittleEndian>()?),
        width => Err(FormatError::InvalidLengthWidth { width, offset }),
    }
}

fn read_value(r: &mut Reader<'_>, format: ChannelFormat) -> Result<f64> {
    Ok(match format {
        ChannelFormat::Float32 => f64::from(r.read_f32::<LittleEndian>()?),
        ChannelFormat::Double64 => r.read_f64::<LittleEndian>()?,
        ChannelFormat::Int8 => f64::from(r.read_i8()?),
        ChannelFormat::Int16 => f64::from(r.read_i16::<LittleEndian>()?),
        ChannelFormat::Int32 => f64::from(r.read_i32::<LittleEndian>()?),
        ChannelFormat::Int64 => r.read_i64::<LittleEndian>()? as f64,
        ChannelFormat::String => {
            return Err(FormatError::UnsupportedChannelFormat(
                "string in numeric stream".to_string(),
            ))
        }
    })
}

fn read_text(r: &mut Reader<'_>) -> Result<String> {
    let len = read_varlen(r)?;
    let offset = r.position();
    let mut bytes = Vec::new();
    r.by_ref().take(len).read_to_end(&mut bytes)?;
    if (bytes.len() as u64) < len {
        return Err(unexpected_eof());
    }
    String::from_utf8(bytes).map_err(|_| FormatError::InvalidUtf8 { offset })
}

/// Unread remainder of a chunk.
fn rest<'a>(r: &Reader<'a>) -> &'a [u8] {
    let data: &'a [u8] = *r.get_ref();
    data.get(r.position() as usize..).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Decode a complete XDF file held in memory.
///
/// Streams are returned in the order their header chunks appear.
/// Timestamps are the raw values from the file, except that omitted
/// timestamps are filled from the previous one plus the nominal sample
/// interval.
pub fn decode(data: &[u8]) -> Result<Recording> {
    let mut reader = Cursor::new(data);
    let mut magic = [0u8; 4];
    if reader.read_exact(&mut magic).is_err() || &magic != MAGIC {
        return Err(FormatError::BadMagic);
    }

    let mut header: Option<FileHeader> = None;
    let mut streams: Vec<Stream> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();
    let total = data.len() as u64;

    while reader.position() < total {
        let offset = reader.position();
        let length = read_varlen(&mut reader)?;
        if length < 2 {
            return Err(FormatError::ShortChunk { offset, length });
        }
        let start = reader.position();
        let end = start
            .checked_add(length)
            .filter(|&end| end <= total)
            .ok_or_else(unexpected_eof)?;
        reader.set_position(end);

        let mut chunk = Cursor::new(&data[..end as usize]);
        chunk.set_position(start);

        match chunk.read_u16::<LittleEndian>()? {
            tag::FILE_HEADER => {
                header = Some(parse_file_header(rest(&chunk))?);
            }
            tag::STREAM_HEADER => {
                let id = chunk.read_u32::<LittleEndian>()?;
                if index.contains_key(&id) {
                    return Err(FormatError::DuplicateStream(id));
                }
                let info = parse_stream_info(rest(&chunk))?;
                log::debug!(
                    "stream {id}: {:?} ({} x {})",
                    info.name,
                    info.channel_count,
                    info.channel_format
                );
                index.insert(id, streams.len());
                streams.push(Stream {
                    time_series: TimeSeries::empty_for(info.channel_format),
                    info,
                    time_stamps: Vec::new(),
                    clock_offsets: Vec::new(),
                });
            }
            tag::SAMPLES => {
                let id = chunk.read_u32::<LittleEndian>()?;
                let stream = lookup(&mut streams, &index, id)?;
                read_samples(&mut chunk, stream)?;
            }
            tag::CLOCK_OFFSET => {
                let id = chunk.read_u32::<LittleEndian>()?;
                let collection_time = chunk.read_f64::<LittleEndian>()?;
                let offset = chunk.read_f64::<LittleEndian>()?;
                lookup(&mut streams, &index, id)?
                    .clock_offsets
                    .push(ClockOffset {
                        collection_time,
                        offset,
                    });
            }
            tag::STREAM_FOOTER => {
                let id = chunk.read_u32::<LittleEndian>()?;
                if !index.contains_key(&id) {
                    return Err(FormatError::UnknownStream(id));
                }
                parse_xml(rest(&chunk), "stream footer")?;
            }
            tag::BOUNDARY => {}
            other => log::trace!("skipping chunk with unknown tag {other} at byte {offset}"),
        }
    }

    let header = header.ok_or(FormatError::MissingFileHeader)?;
    Ok(Recording { header, streams })
}

fn lookup<'s>(
    streams: &'s mut [Stream],
    index: &HashMap<u32, usize>,
    id: u32,
) -> Result<&'s mut Stream> {
    index
        .get(&id)
        .and_then(|&i| streams.get_mut(i))
        .ok_or(FormatError::UnknownStream(id))
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

fn read_samples(chunk: &mut Reader<'_>, stream: &mut Stream) -> Result<()> {
    let count = read_varlen(chunk)?;
    let info = &stream.info;
    let step = if info.is_regular() {
        1.0 / info.nominal_srate
    } else {
        0.0
    };

    for _ in 0..count {
        let offset = chunk.position();
        let stamp = match chunk.read_u8()? {
            0 => None,
            8 => Some(chunk.read_f64::<LittleEndian>()?),
            width => return Err(FormatError::InvalidTimestampWidth { width, offset }),
        };
        let stamp = stamp.unwrap_or_else(|| stream.time_stamps.last().map_or(0.0, |t| t + step));

        match &mut stream.time_series {
            TimeSeries::Numeric(rows) => {
                let row = (0..info.channel_count)
                    .map(|_| read_value(chunk, info.channel_format))
                    .collect::<Result<Vec<f64>>>()?;
                rows.push(row);
            }
            TimeSeries::Text(rows) => {
                let row = (0..info.channel_count)
                    .map(|_| read_text(chunk))
                    .collect::<Result<Vec<String>>>()?;
                rows.push(row);
            }
        }
        stream.time_stamps.push(stamp);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// XML headers
// ---------------------------------------------------------------------------

fn parse_xml(bytes: &[u8], context: &'static str) -> Result<Element> {
    Element::parse(bytes).map_err(|e| FormatError::Xml {
        context,
        message: e.to_string(),
    })
}

fn child_text(el: &Element, name: &str) -> Option<String> {
    el.get_child(name)
        .and_then(|child| child.get_text())
        .map(|text| text.trim().to_string())
}

fn parse_file_header(bytes: &[u8]) -> Result<FileHeader> {
    let info = parse_xml(bytes, "file header")?;
    Ok(FileHeader {
        version: child_text(&info, "version"),
        datetime: child_text(&info, "datetime"),
    })
}

fn parse_stream_info(bytes: &[u8]) -> Result<StreamInfo> {
    let info = parse_xml(bytes, "stream header")?;

    let count_text =
        child_text(&info, "channel_count").ok_or(FormatError::MissingField("channel_count"))?;
    let channel_count = count_text
        .parse::<usize>()
        .map_err(|_| FormatError::InvalidField {
            field: "channel_count",
            value: count_text.clone(),
        })?;

    let format_text =
        child_text(&info, "channel_format").ok_or(FormatError::MissingField("channel_format"))?;
    let channel_format = ChannelFormat::parse(&format_text)
        .ok_or(FormatError::UnsupportedChannelFormat(format_text))?;

    let nominal_srate = match child_text(&info, "nominal_srate") {
        Some(text) => text.parse::<f64>().map_err(|_| FormatError::InvalidField {
            field: "nominal_srate",
            value: text.clone(),
        })?,
        None => 0.0,
    };

    Ok(StreamInfo {
        name: child_text(&info, "name").unwrap_or_default(),
        stream_type: child_text(&info, "type").unwrap_or_default(),
        channel_count,
        nominal_srate,
        channel_format,
        source_id: child_text(&info, "source_id").unwrap_or_default(),
    })
}
