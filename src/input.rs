//! Reading client requests off a network stream.
//!
//! Bytes are accumulated in a per-connection `BytesMut`. Every read drains all
//! complete request frames currently buffered, so pipelined requests are
//! handled in order and a frame split across reads waits for its remainder.

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::resp::{RespError, parse_request};

/// Errors that can occur while reading requests from a client.
#[derive(Error, Debug)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("RESP parse error: {0}")]
    RespParseError(#[from] RespError),
}

/// Reads from `reader` until at least one complete request is buffered and
/// returns every complete request in arrival order.
///
/// A malformed frame discards whatever is buffered. If requests decoded before
/// the malformed bytes they are still returned; otherwise the parse error is.
pub async fn read_requests<R>(
    reader: &mut R,
    buffer: &mut BytesMut,
) -> Result<Vec<Vec<Bytes>>, CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let requests = drain_requests(buffer)?;

        if !requests.is_empty() {
            return Ok(requests);
        }

        if reader.read_buf(buffer).await? == 0 {
            return Err(CommandReadError::ConnectionClosed);
        }
    }
}

/// Decodes every complete request currently held in `buffer`.
pub fn drain_requests(buffer: &mut BytesMut) -> Result<Vec<Vec<Bytes>>, CommandReadError> {
    let mut requests = Vec::new();

    loop {
        match parse_request(buffer) {
            Ok(Some(arguments)) => requests.push(arguments),
            Ok(None) => return Ok(requests),
            Err(error) => {
                buffer.clear();

                if requests.is_empty() {
                    return Err(error.into());
                }

                return Ok(requests);
            }
        }
    }
}
