//! The shared keyspace.
//!
//! Each key maps to exactly one typed [`Value`]. Expiry is passive: an expired
//! string is removed by whichever operation next touches its key. List pushes
//! hand newly available elements straight to blocked clients before the store
//! lock is released.

use std::collections::{HashMap, VecDeque};

use bytes::Bytes;
use thiserror::Error;
use tokio::{sync::oneshot, time::Instant};
use tracing::debug;

use crate::{
    state::State,
    stream::{RequestedStreamId, Stream, StreamId, StreamIdError},
};

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,
    #[error(transparent)]
    StreamId(#[from] StreamIdError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    String(Bytes),
    List(VecDeque<Bytes>),
    Stream(Stream),
}

impl DataType {
    pub fn type_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::List(_) => "list",
            DataType::Stream(_) => "stream",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub data: DataType,
    pub expiration: Option<Instant>,
}

impl Value {
    pub fn new(data: DataType) -> Self {
        Self {
            data,
            expiration: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expiration.is_some_and(|expiration| now >= expiration)
    }
}

/// Outcome of a blocking pop attempt.
#[derive(Debug)]
pub enum BlockingPop {
    /// The list had an element, which has been removed.
    Ready(Bytes),
    /// The list was empty or missing; the caller has been queued.
    Waiting {
        subscriber_id: u64,
        receiver: oneshot::Receiver<Bytes>,
    },
}

#[derive(Debug, Default)]
pub struct KeyValueStore {
    entries: HashMap<Bytes, Value>,
    blocked_clients: State,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live entry stored under `key`, dropping it first if it has
    /// expired.
    fn live_entry(&mut self, key: &[u8]) -> Option<&mut Value> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|value| value.is_expired(Instant::now()));

        if expired {
            self.entries.remove(key);
            debug!(key = %String::from_utf8_lossy(key), "removed expired key");
        }

        self.entries.get_mut(key)
    }

    pub fn get(&mut self, key: &[u8]) -> Result<Option<Bytes>, StoreError> {
        match self.live_entry(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::String(value),
                ..
            }) => Ok(Some(value.clone())),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Stores a string, replacing whatever the key held before.
    pub fn set(&mut self, key: Bytes, value: Bytes, expiration: Option<Instant>) {
        self.entries.insert(
            key,
            Value {
                data: DataType::String(value),
                expiration,
            },
        );
    }

    /// Appends `values` to the tail of the list, or inserts them one by one at
    /// the head when `at_head` is set. Returns the list length after the push.
    ///
    /// Blocked clients waiting on `key` are served before this returns.
    pub fn push(
        &mut self,
        key: Bytes,
        values: Vec<Bytes>,
        at_head: bool,
    ) -> Result<usize, StoreError> {
        if self.live_entry(&key).is_none() {
            self.entries
                .insert(key.clone(), Value::new(DataType::List(VecDeque::new())));
        }

        let Some(Value {
            data: DataType::List(list),
            ..
        }) = self.entries.get_mut(&key)
        else {
            return Err(StoreError::WrongType);
        };

        add_values_to_list(list, values, at_head);
        let length = list.len();

        self.serve_blocked_clients(&key);

        Ok(length)
    }

    /// Hands one head element to each waiting client, oldest first, until
    /// either the list or the queue runs out.
    fn serve_blocked_clients(&mut self, key: &Bytes) {
        let Some(Value {
            data: DataType::List(list),
            ..
        }) = self.entries.get_mut(key)
        else {
            return;
        };

        while !list.is_empty() {
            let Some(subscriber) = self.blocked_clients.pop_subscriber(key) else {
                break;
            };

            let Some(value) = list.pop_front() else {
                break;
            };

            let subscriber_id = subscriber.id;

            match subscriber.deliver(value) {
                Ok(()) => debug!(
                    key = %String::from_utf8_lossy(key),
                    subscriber_id,
                    "handed element to blocked client"
                ),
                Err(value) => list.push_front(value),
            }
        }
    }

    /// Pops the head of the list if it has one, otherwise registers the caller
    /// as a blocked client of `key`.
    pub fn blocking_pop(&mut self, key: &Bytes) -> Result<BlockingPop, StoreError> {
        match self.live_entry(key) {
            Some(Value {
                data: DataType::List(list),
                ..
            }) => {
                if let Some(value) = list.pop_front() {
                    return Ok(BlockingPop::Ready(value));
                }
            }
            Some(_) => return Err(StoreError::WrongType),
            None => (),
        }

        let (subscriber_id, receiver) = self.blocked_clients.add_subscriber(key.clone());

        Ok(BlockingPop::Waiting {
            subscriber_id,
            receiver,
        })
    }

    /// Withdraws a blocked client. Returns `false` if it was already served.
    pub fn cancel_blocking_pop(&mut self, key: &[u8], subscriber_id: u64) -> bool {
        self.blocked_clients.remove_subscriber(key, subscriber_id)
    }

    pub fn blocked_client_count(&self, key: &[u8]) -> usize {
        self.blocked_clients.subscriber_count(key)
    }

    /// Returns the inclusive range `start..=stop` of the list. Missing keys and
    /// keys of another type yield an empty range.
    pub fn range(&mut self, key: &[u8], start: i64, stop: i64) -> Vec<Bytes> {
        let Some(Value {
            data: DataType::List(list),
            ..
        }) = self.live_entry(key)
        else {
            return Vec::new();
        };

        match validate_range_indexes(list.len(), start, stop) {
            Ok((start, end)) => list.range(start..=end).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn list_len(&mut self, key: &[u8]) -> Result<usize, StoreError> {
        match self.live_entry(key) {
            None => Ok(0),
            Some(Value {
                data: DataType::List(list),
                ..
            }) => Ok(list.len()),
            Some(_) => Err(StoreError::WrongType),
        }
    }

    /// Removes up to `count` elements from the head of the list.
    ///
    /// Returns `None` when the key does not exist.
    pub fn pop_front(
        &mut self,
        key: &[u8],
        count: usize,
    ) -> Result<Option<Vec<Bytes>>, StoreError> {
        match self.live_entry(key) {
            None => Ok(None),
            Some(Value {
                data: DataType::List(list),
                ..
            }) => {
                let amount = count.min(list.len());
                Ok(Some(list.drain(..amount).collect()))
            }
            Some(_) => Err(StoreError::WrongType),
        }
    }

    pub fn type_of(&mut self, key: &[u8]) -> &'static str {
        self.live_entry(key)
            .map_or("none", |value| value.data.type_name())
    }

    /// Appends an entry to the stream at `key`, creating the stream if needed.
    /// A stream is never created for an entry whose ID is rejected.
    pub fn add_stream_entry(
        &mut self,
        key: Bytes,
        requested_id: RequestedStreamId,
        fields: Vec<(Bytes, Bytes)>,
        now_milliseconds: u64,
    ) -> Result<StreamId, StoreError> {
        match self.live_entry(&key) {
            Some(Value {
                data: DataType::Stream(stream),
                ..
            }) => Ok(stream.append(requested_id, fields, now_milliseconds)?),
            Some(_) => Err(StoreError::WrongType),
            None => {
                let mut stream = Stream::new();
                let id = stream.append(requested_id, fields, now_milliseconds)?;
                self.entries
                    .insert(key, Value::new(DataType::Stream(stream)));

                Ok(id)
            }
        }
    }

    /// Direct read access for inspection, without expiry handling.
    pub fn raw_entry(&self, key: &[u8]) -> Option<&Value> {
        self.entries.get(key)
    }
}

fn add_values_to_list(list: &mut VecDeque<Bytes>, values: Vec<Bytes>, at_head: bool) {
    for value in values {
        if at_head {
            list.push_front(value);
        } else {
            list.push_back(value);
        }
    }
}

/// Normalizes LRANGE-style indexes for a list of `len` elements.
///
/// Negative indexes count from the end (`-1` is the last element). Both ends
/// are clamped into the list; an empty resulting range is an error.
pub fn validate_range_indexes(
    len: usize,
    start_index: i64,
    end_index: i64,
) -> Result<(usize, usize), &'static str> {
    let len = len as i64;

    if len == 0 {
        return Err("List is empty");
    }

    let mut start = if start_index < 0 {
        len + start_index
    } else {
        start_index
    };
    let mut end = if end_index < 0 {
        len + end_index
    } else {
        end_index
    };

    start = start.max(0);
    end = end.min(len - 1);

    if start >= len {
        return Err("Start index is out of bounds");
    }

    if start > end {
        return Err("Start index is bigger than end index after processing");
    }

    Ok((start as usize, end as usize))
}
