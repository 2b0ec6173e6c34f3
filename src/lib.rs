//! An in-memory key-value server speaking a subset of the Redis protocol.
//!
//! Supported commands:
//!
//! - Connection: PING, ECHO
//! - Strings with optional millisecond expiry: SET, GET
//! - Lists: RPUSH, LPUSH, LRANGE, LLEN, LPOP, and the blocking BLPOP
//! - Streams: XADD
//! - Keyspace: TYPE
//!
//! Every client runs on its own Tokio task. All clients share one
//! [`key_value_store::KeyValueStore`] behind a single mutex, and clients blocked
//! in BLPOP are woken in arrival order by the pushes that feed their list.

pub mod commands;
pub mod connection;
pub mod input;
pub mod key_value_store;
pub mod resp;
pub mod server;
pub mod state;
pub mod stream;
