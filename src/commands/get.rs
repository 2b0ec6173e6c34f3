use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::command_error::CommandError, key_value_store::KeyValueStore, resp::RespValue,
};

/// Represents the parsed arguments for the GET command
pub struct GetArguments {
    /// The key name to retrieve from the store
    key: Bytes,
}

impl GetArguments {
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        let [key] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("get"));
        };

        Ok(Self { key: key.clone() })
    }
}

/// Handles the Redis GET command.
///
/// Returns the string stored at the key, or a null bulk string when the key
/// is missing or has expired. Reading an expired key removes it.
///
/// # Returns
///
/// * `Ok(RespValue)` - The value as a bulk string, or null
/// * `Err(CommandError::WrongType)` - If the key holds a list or a stream
pub async fn get(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let get_arguments = GetArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;

    match store_guard.get(&get_arguments.key)? {
        Some(value) => Ok(RespValue::BulkString(value)),
        None => Ok(RespValue::Null),
    }
}
