use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, command_utils::parse_integer},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

/// Represents the parsed arguments for the LRANGE command.
///
/// Both indexes may be negative to count from the end of the list.
pub struct LrangeArguments {
    /// The key name to retrieve from the store
    key: Bytes,
    /// The starting index for the range
    start_index: i64,
    /// The ending index for the range, inclusive
    end_index: i64,
}

impl LrangeArguments {
    pub fn parse(arguments: &[Bytes]) -> Result<Self, CommandError> {
        let [key, start_index, end_index] = arguments else {
            return Err(CommandError::wrong_number_of_arguments("lrange"));
        };

        Ok(Self {
            key: key.clone(),
            start_index: parse_integer(start_index)?,
            end_index: parse_integer(end_index)?,
        })
    }
}

/// Handles the Redis LRANGE command.
///
/// Returns the inclusive range of list elements between the two indexes.
/// Missing keys, keys of another type and ranges that select nothing all
/// produce an empty array.
///
/// # Examples
///
/// ```text
/// RPUSH mylist a b c d e
/// LRANGE mylist 0 2    -> [a, b, c]
/// LRANGE mylist -2 -1  -> [d, e]
/// LRANGE mylist 5 10   -> []
/// ```
pub async fn lrange(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &[Bytes],
) -> Result<RespValue, CommandError> {
    let lrange_arguments = LrangeArguments::parse(arguments)?;

    let mut store_guard = store.lock().await;
    let range = store_guard.range(
        &lrange_arguments.key,
        lrange_arguments.start_index,
        lrange_arguments.end_index,
    );

    Ok(RespValue::array_of_bulk_strings(range))
}
