//! Append-only streams and entry ID sequencing.

use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, SystemTimeError},
};

use bytes::Bytes;
use thiserror::Error;

/// Errors raised while resolving or validating a stream entry ID.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum StreamIdError {
    #[error("Invalid stream ID specified as stream command argument")]
    InvalidFormat,
    #[error("The ID specified in XADD must be greater than 0-0")]
    ZeroId,
    #[error("The ID specified in XADD is equal or smaller than the target stream top item")]
    NotIncreasing,
}

/// Identifier of a stream entry, ordered by milliseconds and then by sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StreamId {
    pub milliseconds: u64,
    pub sequence: u64,
}

impl StreamId {
    pub const ZERO: StreamId = StreamId::new(0, 0);

    pub const fn new(milliseconds: u64, sequence: u64) -> Self {
        Self {
            milliseconds,
            sequence,
        }
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.milliseconds, self.sequence)
    }
}

/// The ID argument given to XADD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedStreamId {
    /// `<ms>-<seq>`
    Explicit(StreamId),
    /// `<ms>-*`
    AutoSequence(u64),
    /// `*`
    Auto,
}

impl FromStr for RequestedStreamId {
    type Err = StreamIdError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input == "*" {
            return Ok(RequestedStreamId::Auto);
        }

        let (milliseconds, sequence) = input
            .split_once('-')
            .ok_or(StreamIdError::InvalidFormat)?;

        let milliseconds = parse_id_part(milliseconds)?;

        if sequence == "*" {
            return Ok(RequestedStreamId::AutoSequence(milliseconds));
        }

        Ok(RequestedStreamId::Explicit(StreamId::new(
            milliseconds,
            parse_id_part(sequence)?,
        )))
    }
}

fn parse_id_part(part: &str) -> Result<u64, StreamIdError> {
    // u64::from_str accepts a leading '+', which is not valid inside an ID.
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamIdError::InvalidFormat);
    }

    part.parse::<u64>().map_err(|_| StreamIdError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: StreamId,
    /// Field/value pairs in the order they were given.
    pub fields: Vec<(Bytes, Bytes)>,
}

/// An append-only sequence of entries with strictly increasing IDs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    entries: Vec<StreamEntry>,
}

impl Stream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_id(&self) -> Option<StreamId> {
        self.entries.last().map(|entry| entry.id)
    }

    /// Resolves `requested` into the ID the next entry would receive.
    ///
    /// `now_milliseconds` is only consulted for a fully automatic ID. The
    /// resolved ID must be greater than `0-0` and greater than the current top
    /// entry.
    pub fn next_id(
        &self,
        requested: RequestedStreamId,
        now_milliseconds: u64,
    ) -> Result<StreamId, StreamIdError> {
        let last_id = self.last_id();

        let id = match requested {
            RequestedStreamId::Explicit(id) => id,
            RequestedStreamId::AutoSequence(milliseconds) => {
                StreamId::new(milliseconds, self.next_sequence(milliseconds)?)
            }
            RequestedStreamId::Auto => {
                // Never step behind the top entry if the wall clock moved backwards.
                let milliseconds = last_id
                    .map_or(now_milliseconds, |last| last.milliseconds.max(now_milliseconds));

                StreamId::new(milliseconds, self.next_sequence(milliseconds)?)
            }
        };

        if id == StreamId::ZERO {
            return Err(StreamIdError::ZeroId);
        }

        if last_id.is_some_and(|last| id <= last) {
            return Err(StreamIdError::NotIncreasing);
        }

        Ok(id)
    }

    fn next_sequence(&self, milliseconds: u64) -> Result<u64, StreamIdError> {
        match self.last_id() {
            Some(last) if last.milliseconds == milliseconds => last
                .sequence
                .checked_add(1)
                .ok_or(StreamIdError::NotIncreasing),
            _ if milliseconds == 0 => Ok(1),
            _ => Ok(0),
        }
    }

    /// Appends a new entry and returns the ID it was stored under. Nothing is
    /// appended when the ID is rejected.
    pub fn append(
        &mut self,
        requested: RequestedStreamId,
        fields: Vec<(Bytes, Bytes)>,
        now_milliseconds: u64,
    ) -> Result<StreamId, StreamIdError> {
        let id = self.next_id(requested, now_milliseconds)?;
        self.entries.push(StreamEntry { id, fields });

        Ok(id)
    }
}

pub fn get_timestamp_in_milliseconds() -> Result<u64, SystemTimeError> {
    let duration_since_epoch = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;

    Ok(duration_since_epoch.as_millis() as u64)
}
