//! Redis Serialization Protocol (RESP) encoding and decoding.
//!
//! Client requests are always arrays of bulk strings. Replies use one of the
//! simple string, error, integer, bulk string or array shapes. Decoding works on
//! a `BytesMut` read buffer so that partially received frames stay buffered until
//! the rest of the bytes arrive.

use std::ops::Range;

use bytes::{Bytes, BytesMut};
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";
/// Largest bulk string a peer may declare, as Redis's `proto-max-bulk-len`.
const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;
/// Largest number of elements a peer may declare for one array.
const MAX_ARRAY_LENGTH: i64 = 1024 * 1024;

/// Errors produced while decoding RESP frames.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("unknown RESP type")]
    UnknownRespType,
    #[error("failed to parse integer")]
    FailedToParseInteger,
    #[error("invalid bulk string")]
    InvalidBulkString,
    #[error("invalid array")]
    InvalidArray,
}

/// A single RESP value.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    /// Null bulk string (`$-1`).
    Null,
    Array(Vec<RespValue>),
    /// Null array (`*-1`).
    NullArray,
}

impl RespValue {
    pub fn simple_string(value: &str) -> Self {
        RespValue::SimpleString(value.to_string())
    }

    pub fn bulk_string(value: impl Into<Bytes>) -> Self {
        RespValue::BulkString(value.into())
    }

    /// Builds an array whose elements are all bulk strings.
    pub fn array_of_bulk_strings<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        RespValue::Array(values.into_iter().map(RespValue::BulkString).collect())
    }

    /// Encodes the value into its wire representation.
    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_to(&mut buffer);
        buffer.freeze()
    }

    pub fn encode_to(&self, buffer: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => {
                buffer.extend_from_slice(b"+");
                buffer.extend_from_slice(s.as_bytes());
                buffer.extend_from_slice(CRLF);
            }
            RespValue::Error(message) => {
                buffer.extend_from_slice(b"-");
                buffer.extend_from_slice(message.as_bytes());
                buffer.extend_from_slice(CRLF);
            }
            RespValue::Integer(number) => {
                buffer.extend_from_slice(format!(":{}\r\n", number).as_bytes());
            }
            RespValue::BulkString(data) => {
                buffer.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
                buffer.extend_from_slice(data);
                buffer.extend_from_slice(CRLF);
            }
            RespValue::Null => buffer.extend_from_slice(b"$-1\r\n"),
            RespValue::Array(elements) => {
                buffer.extend_from_slice(format!("*{}\r\n", elements.len()).as_bytes());

                for element in elements {
                    element.encode_to(buffer);
                }
            }
            RespValue::NullArray => buffer.extend_from_slice(b"*-1\r\n"),
        }
    }

    /// Decodes every complete RESP value at the front of `buffer`.
    ///
    /// Consumed bytes are removed from the buffer; a trailing incomplete value is
    /// left in place so it can be completed by a later read.
    pub fn parse(buffer: &mut BytesMut) -> Result<Vec<RespValue>, RespError> {
        let mut values = Vec::new();

        while let Some((value, consumed)) = decode_value(&buffer[..], 0)? {
            let _ = buffer.split_to(consumed);
            values.push(value);
        }

        Ok(values)
    }
}

/// Decodes one client request from the front of `buffer`.
///
/// Returns `Ok(None)` without consuming anything when the buffer does not yet
/// hold a whole frame. A complete frame is removed from the buffer and its
/// arguments are returned as zero-copy slices of the received bytes. Empty or
/// null arrays decode to an empty argument list.
pub fn parse_request(buffer: &mut BytesMut) -> Result<Option<Vec<Bytes>>, RespError> {
    let Some((ranges, consumed)) = decode_request(&buffer[..])? else {
        return Ok(None);
    };

    let frame = buffer.split_to(consumed).freeze();

    Ok(Some(
        ranges.into_iter().map(|range| frame.slice(range)).collect(),
    ))
}

fn decode_request(input: &[u8]) -> Result<Option<(Vec<Range<usize>>, usize)>, RespError> {
    let Some(&prefix) = input.first() else {
        return Ok(None);
    };

    if prefix != b'*' {
        return Err(RespError::InvalidArray);
    }

    let Some((line, mut position)) = read_line(input, 1) else {
        return Ok(None);
    };

    let declared_length = parse_integer(line)?;

    if declared_length > MAX_ARRAY_LENGTH {
        return Err(RespError::InvalidArray);
    }

    if declared_length <= 0 {
        return Ok(Some((Vec::new(), position)));
    }

    let mut arguments = Vec::with_capacity((declared_length as usize).min(1024));

    for _ in 0..declared_length {
        let Some(&element_prefix) = input.get(position) else {
            return Ok(None);
        };

        if element_prefix != b'$' {
            return Err(RespError::InvalidBulkString);
        }

        let Some((line, data_start)) = read_line(input, position + 1) else {
            return Ok(None);
        };

        let length = bulk_length(parse_integer(line)?)?;
        let data_end = data_start + length;

        if input.len() < data_end + CRLF.len() {
            return Ok(None);
        }

        if &input[data_end..data_end + CRLF.len()] != CRLF {
            return Err(RespError::InvalidBulkString);
        }

        arguments.push(data_start..data_end);
        position = data_end + CRLF.len();
    }

    Ok(Some((arguments, position)))
}

fn decode_value(input: &[u8], start: usize) -> Result<Option<(RespValue, usize)>, RespError> {
    let Some(&prefix) = input.get(start) else {
        return Ok(None);
    };

    let Some((line, next)) = read_line(input, start + 1) else {
        return Ok(None);
    };

    match prefix {
        b'+' => Ok(Some((RespValue::SimpleString(utf8(line)?), next))),
        b'-' => Ok(Some((RespValue::Error(utf8(line)?), next))),
        b':' => Ok(Some((RespValue::Integer(parse_integer(line)?), next))),
        b'$' => {
            let declared_length = parse_integer(line)?;

            if declared_length < 0 {
                return Ok(Some((RespValue::Null, next)));
            }

            let data_end = next + bulk_length(declared_length)?;

            if input.len() < data_end + CRLF.len() {
                return Ok(None);
            }

            if &input[data_end..data_end + CRLF.len()] != CRLF {
                return Err(RespError::InvalidBulkString);
            }

            Ok(Some((
                RespValue::BulkString(Bytes::copy_from_slice(&input[next..data_end])),
                data_end + CRLF.len(),
            )))
        }
        b'*' => {
            let declared_length = parse_integer(line)?;

            if declared_length < 0 {
                return Ok(Some((RespValue::NullArray, next)));
            }

            if declared_length > MAX_ARRAY_LENGTH {
                return Err(RespError::InvalidArray);
            }

            let mut elements = Vec::with_capacity((declared_length as usize).min(1024));
            let mut position = next;

            for _ in 0..declared_length {
                let Some((element, after)) = decode_value(input, position)? else {
                    return Ok(None);
                };

                elements.push(element);
                position = after;
            }

            Ok(Some((RespValue::Array(elements), position)))
        }
        _ => Err(RespError::UnknownRespType),
    }
}

/// Returns the line starting at `start` without its terminator, and the index
/// just past the terminator.
fn read_line(input: &[u8], start: usize) -> Option<(&[u8], usize)> {
    let remaining = input.get(start..)?;
    let position = remaining.windows(2).position(|window| window == CRLF)?;

    Some((&remaining[..position], start + position + CRLF.len()))
}

/// Checks a declared bulk string length against [`MAX_BULK_LENGTH`].
fn bulk_length(declared_length: i64) -> Result<usize, RespError> {
    usize::try_from(declared_length)
        .ok()
        .filter(|&length| length <= MAX_BULK_LENGTH)
        .ok_or(RespError::InvalidBulkString)
}

fn utf8(line: &[u8]) -> Result<String, RespError> {
    std::str::from_utf8(line)
        .map(str::to_string)
        .map_err(|_| RespError::InvalidUtf8)
}

fn parse_integer(line: &[u8]) -> Result<i64, RespError> {
    std::str::from_utf8(line)
        .map_err(|_| RespError::InvalidUtf8)?
        .parse::<i64>()
        .map_err(|_| RespError::FailedToParseInteger)
}
