use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

/// Parsed arguments shared by RPUSH and LPUSH.
pub struct PushArrayOperations {
    key: Bytes,
    values: Vec<Bytes>,
}

impl PushArrayOperations {
    pub fn parse(arguments: &[Bytes], should_prepend: bool) -> Result<Self, CommandError> {
        let [key, values @ ..] = arguments else {
            return Err(push_arity_error(should_prepend));
        };

        if values.is_empty() {
            return Err(push_arity_error(should_prepend));
        }

        Ok(Self {
            key: key.clone(),
            values: values.to_vec(),
        })
    }
}

fn push_arity_error(should_prepend: bool) -> CommandError {
    if should_prepend {
        CommandError::wrong_number_of_arguments("lpush")
    } else {
        CommandError::wrong_number_of_arguments("rpush")
    }
}

/// Handles the Redis RPUSH command: appends every value to the tail of the list.
pub async fn rpush(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    push_array_operations(store, arguments, false).await
}

/// Handles the Redis LPUSH command: inserts every value at the head of the
/// list, one after another, so `LPUSH k a b` leaves `b` first.
pub async fn lpush(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    push_array_operations(store, arguments, true).await
}

/// Pushes the values and replies with the list length after the push.
///
/// Blocked BLPOP clients of the key are served while the store is still
/// locked, so the reported length can be larger than what a following LLEN
/// observes.
async fn push_array_operations(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
    should_prepend: bool,
) -> Result<RespValue, CommandError> {
    let push_array_arguments = PushArrayOperations::parse(arguments, should_prepend)?;

    let mut store_guard = store.lock().await;
    let list_length = store_guard.push(
        push_array_arguments.key,
        push_array_arguments.values,
        should_prepend,
    )?;

    Ok(RespValue::Integer(list_length as i64))
}
