use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use tokio::sync::{Mutex, oneshot};
use tracing::debug;

use crate::{
    commands::{command_error::CommandError, command_utils::argument_as_str},
    key_value_store::{BlockingPop, KeyValueStore},
    resp::RespValue,
    state::DisconnectSignal,
};

/// Represents the parsed arguments for the BLPOP command
#[derive(Debug, PartialEq)]
pub struct BlpopArguments {
    /// The list to pop from
    key: Bytes,
    /// How long to wait for an element; `None` waits forever
    timeout: Option<Duration>,
}

impl BlpopArguments {
    /// Parses `[key, timeout]`, where the timeout is a number of seconds that
    /// may have a fractional part. A timeout of `0` blocks indefinitely.
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        let [key, timeout] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("blpop"));
        };

        let seconds = argument_as_str(timeout)
            .and_then(|text| text.parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite())
            .ok_or(CommandError::InvalidTimeout)?;

        if seconds < 0.0 {
            return Err(CommandError::NegativeTimeout);
        }

        let timeout = if seconds == 0.0 {
            None
        } else {
            Some(Duration::try_from_secs_f64(seconds).map_err(|_| CommandError::InvalidTimeout)?)
        };

        Ok(Self {
            key: key.clone(),
            timeout,
        })
    }
}

/// Handles the Redis BLPOP command.
///
/// Pops the head of the list right away when it has one. Otherwise the client
/// is queued behind earlier BLPOP callers on the same key and waits, without
/// holding the store lock, until a push hands it an element, the timeout
/// elapses or `disconnect` reports that the client went away. A client that
/// leaves gives up its place, and an element already handed to it is put back
/// at the head of the list.
///
/// # Returns
///
/// * `Ok(RespValue)` - `[key, value]`, or a null array on timeout
/// * `Err(CommandError::InvalidTimeout)` / `Err(CommandError::NegativeTimeout)` -
///   If the timeout is not a non-negative number
/// * `Err(CommandError::WrongType)` - If the key holds a string or a stream
pub async fn blpop(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
    mut disconnect: DisconnectSignal,
) -> Result<RespValue, CommandError> {
    let blpop_arguments = BlpopArguments::parse(arguments)?;
    let key = blpop_arguments.key;

    let blocking_pop = {
        let mut store_guard = store.lock().await;
        store_guard.blocking_pop(&key)?
    };

    let (subscriber_id, mut receiver) = match blocking_pop {
        BlockingPop::Ready(value) => return Ok(key_value_reply(key, value)),
        BlockingPop::Waiting {
            subscriber_id,
            receiver,
        } => (subscriber_id, receiver),
    };

    debug!(key = %String::from_utf8_lossy(&key), subscriber_id, "client blocked");

    let wake = tokio::select! {
        biased;

        () = disconnect.wait() => Wake::ClientGone,
        received = wait_for_element(&mut receiver, blpop_arguments.timeout) => match received {
            Some(value) => Wake::Served(value),
            None => Wake::TimedOut,
        },
    };

    match wake {
        Wake::Served(value) => {
            debug!(key = %String::from_utf8_lossy(&key), subscriber_id, "blocked client woken");
            Ok(key_value_reply(key, value))
        }
        Wake::TimedOut => {
            let mut store_guard = store.lock().await;

            // A push may have served us between the deadline and the lock.
            if store_guard.cancel_blocking_pop(&key, subscriber_id) {
                debug!(key = %String::from_utf8_lossy(&key), subscriber_id, "blocked client timed out");
                return Ok(RespValue::NullArray);
            }

            match receiver.try_recv() {
                Ok(value) => Ok(key_value_reply(key, value)),
                Err(_) => Ok(RespValue::NullArray),
            }
        }
        Wake::ClientGone => {
            let mut store_guard = store.lock().await;

            if !store_guard.cancel_blocking_pop(&key, subscriber_id) {
                if let Ok(value) = receiver.try_recv() {
                    // Nobody will read the reply; the element goes back to the list.
                    if let Err(error) = store_guard.push(key.clone(), vec![value], true) {
                        debug!(key = %String::from_utf8_lossy(&key), %error, "could not return element");
                    }
                }
            }

            debug!(key = %String::from_utf8_lossy(&key), subscriber_id, "blocked client disconnected");
            Ok(RespValue::NullArray)
        }
    }
}

enum Wake {
    Served(Bytes),
    TimedOut,
    ClientGone,
}

/// Waits for a push to hand over an element. `None` means the timeout elapsed.
async fn wait_for_element(
    receiver: &mut oneshot::Receiver<Bytes>,
    timeout: Option<Duration>,
) -> Option<Bytes> {
    match timeout {
        None => receiver.await.ok(),
        Some(timeout) => tokio::time::timeout(timeout, receiver)
            .await
            .ok()
            .and_then(Result::ok),
    }
}

fn key_value_reply(key: Bytes, value: Bytes) -> RespValue {
    RespValue::array_of_bulk_strings([key, value])
}
